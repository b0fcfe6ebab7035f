use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use spotprice_core::{
    Credentials, Marketprice, PriceSource, PriceUnit, Source, SpotError, compress_marketdata,
    ensure_chronological,
};

use crate::adapter::{RealAdapter, StwHasApi};
use crate::payload::StwHasResponse;

const NAME: &str = Source::StwHas.display_name();

/// Length of published intervals; the feed itself is quarter-hourly.
const OUTPUT_MINUTES: u32 = 60;

/// Stadtwerk Haßfurt EEX prices.
///
/// The feed delivers sub-hour intervals in ct/kWh. Contiguous equal prices are compressed
/// into runs of at most one hour before publishing.
pub struct StwHasSource {
    api: Arc<dyn StwHasApi>,
    market_area: String,
    credentials: Credentials,
}

impl StwHasSource {
    /// Build against the production API.
    ///
    /// # Errors
    /// Returns `SpotError::InvalidArg` for an unsupported market area, or `SpotError::Other`
    /// if the HTTP client cannot be built.
    pub fn new(market_area: &str, credentials: Credentials) -> Result<Self, SpotError> {
        let api: Arc<dyn StwHasApi> = Arc::new(RealAdapter::try_new_default()?);
        Self::with_api(market_area, credentials, api)
    }

    /// Build with an injected API.
    ///
    /// # Errors
    /// Returns `SpotError::InvalidArg` for an unsupported market area.
    pub fn with_api(
        market_area: &str,
        credentials: Credentials,
        api: Arc<dyn StwHasApi>,
    ) -> Result<Self, SpotError> {
        if !Source::StwHas.supports_market_area(market_area) {
            return Err(SpotError::InvalidArg(format!(
                "{NAME} does not serve market area {market_area:?}"
            )));
        }
        Ok(Self {
            api,
            market_area: market_area.to_string(),
            credentials,
        })
    }

    fn extract(resp: StwHasResponse) -> Result<Vec<Marketprice>, SpotError> {
        if resp.interval <= 0 {
            return Err(SpotError::data_format(
                NAME,
                format!("non-positive interval {}", resp.interval),
            ));
        }
        PriceUnit::ensure_declared(&resp.unit, PriceUnit::CtPerKwh, NAME)?;
        resp.data
            .into_iter()
            .map(|v| {
                Marketprice::with_duration(
                    v.datetime.with_timezone(&Utc),
                    resp.interval,
                    v.price,
                    PriceUnit::CtPerKwh,
                )
                .map(|m| m.interpolated(v.interpolated))
                .map_err(|e| SpotError::data_format(NAME, e.to_string()))
            })
            .collect()
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "spotprice_sources::stwhas::fetch",
            skip(self),
            fields(market_area = %self.market_area),
            err
        )
    )]
    async fn fetch_series(&self) -> Result<Vec<Marketprice>, SpotError> {
        let resp = self.api.eex_data(&self.credentials).await?;
        let series = Self::extract(resp)?;
        ensure_chronological(&series, NAME)?;
        #[cfg(feature = "tracing")]
        let raw_len = series.len();
        let compressed =
            compress_marketdata(series, TimeDelta::minutes(i64::from(OUTPUT_MINUTES)));
        #[cfg(feature = "tracing")]
        tracing::debug!(raw = raw_len, compressed = compressed.len(), "extracted marketdata");
        Ok(compressed)
    }
}

#[async_trait]
impl PriceSource for StwHasSource {
    fn name(&self) -> &str {
        NAME
    }

    fn market_area(&self) -> &str {
        &self.market_area
    }

    fn duration(&self) -> u32 {
        OUTPUT_MINUTES
    }

    async fn fetch_marketdata(&self) -> Result<Vec<Marketprice>, SpotError> {
        self.fetch_series().await
    }
}
