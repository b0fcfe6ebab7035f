//! spotprice-sources
//!
//! Provider adapters implementing `PriceSource` on top of `reqwest`:
//!
//! - [`AwattarSource`]: aWATTar, hourly EUR/MWh converted to EUR/kWh.
//! - [`StwHasSource`]: Stadtwerk Haßfurt, quarter-hourly ct/kWh compressed to hourly runs.
//! - [`EnergyAssistantSource`]: Energy Assistant, token login and a local-time correction.
//!
//! Each adapter talks to its provider through a small API trait in [`adapter`], so tests can
//! inject closures instead of a network.
#![warn(missing_docs)]

/// Provider API traits and the production adapter backed by `reqwest`.
pub mod adapter;
/// Raw provider payloads.
pub mod payload;

mod awattar;
mod energy_assistant;
mod stwhas;

use std::sync::Arc;

pub use awattar::AwattarSource;
pub use energy_assistant::EnergyAssistantSource;
pub use stwhas::StwHasSource;

use adapter::RealAdapter;
use spotprice_core::{Clock, PriceSource, SourceConfig, SpotError, SystemClock};

/// Build the adapter selected by `cfg` against the production endpoints.
///
/// # Errors
/// Returns `SpotError::InvalidArg` if the configuration does not validate, or
/// `SpotError::Other` if the HTTP client cannot be built.
pub fn from_config(cfg: &SourceConfig) -> Result<Arc<dyn PriceSource>, SpotError> {
    from_config_with(cfg, &RealAdapter::try_new_default()?, Arc::new(SystemClock))
}

/// Build the adapter selected by `cfg` on a given transport and clock.
///
/// # Errors
/// Returns `SpotError::InvalidArg` if the configuration does not validate.
pub fn from_config_with(
    cfg: &SourceConfig,
    adapter: &RealAdapter,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn PriceSource>, SpotError> {
    cfg.validate()?;
    let shared = Arc::new(adapter.clone());
    let source: Arc<dyn PriceSource> = match cfg {
        SourceConfig::Awattar { market_area } => {
            Arc::new(AwattarSource::with_api(market_area, shared, clock)?)
        }
        SourceConfig::StwHas {
            market_area,
            credentials,
        } => Arc::new(StwHasSource::with_api(
            market_area,
            credentials.clone(),
            shared,
        )?),
        SourceConfig::EnergyAssistant {
            market_area,
            credentials,
        } => Arc::new(EnergyAssistantSource::with_api(
            market_area,
            credentials.clone(),
            shared,
            clock,
        )?),
        other => {
            return Err(SpotError::InvalidArg(format!(
                "no adapter for source {}",
                other.source()
            )));
        }
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(
        source = source.name(),
        market_area = source.market_area(),
        "built price source"
    );
    Ok(source)
}
