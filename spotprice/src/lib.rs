//! spotprice publishes normalized day-ahead electricity prices.
//!
//! Overview
//! - Wraps one [`PriceSource`] adapter per configured provider (see `spotprice-sources`).
//! - Keeps the last successfully fetched series; a failed or timed-out fetch never clears it.
//! - Offers lookups on the published series (`current`, `lowest`, `highest`) and net prices
//!   after surcharge and tax.
//! - Refreshes independent instances concurrently with [`refresh_all`].
//!
//! Example
//! ```rust,ignore
//! use spotprice::{SourceConfig, SpotPrice, SpotPriceConfig};
//!
//! let cfg = SourceConfig::Awattar { market_area: "de".into() };
//! let mut prices = SpotPrice::from_config(&cfg, SpotPriceConfig::default())?;
//! prices.fetch().await?;
//! if let Some(now) = prices.current(chrono::Utc::now()) {
//!     println!("{now}");
//! }
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod refresh;

pub use core::{SpotPrice, SpotPriceBuilder};
pub use refresh::refresh_all;

// Re-export core types for convenience
pub use spotprice_core::{
    Credentials, Marketprice, PriceSource, PriceUnit, PricingOptions, Source, SourceConfig,
    SpotError, SpotPriceConfig, compress_marketdata,
};
