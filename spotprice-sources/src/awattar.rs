use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Days};
use chrono_tz::Tz;
use spotprice_core::clock::{local_date, local_midnight};
use spotprice_core::{
    Clock, Marketprice, PriceSource, PriceUnit, Source, SpotError, SystemClock,
    ensure_chronological,
};

use crate::adapter::{AwattarApi, RealAdapter};
use crate::payload::AwattarEntry;

const NAME: &str = Source::Awattar.display_name();

/// aWATTar day-ahead prices for Germany and Austria.
///
/// The provider declares EUR/MWh; prices are converted once to EUR/kWh, the stored unit.
pub struct AwattarSource {
    api: Arc<dyn AwattarApi>,
    clock: Arc<dyn Clock>,
    market_area: String,
    tz: Tz,
}

impl AwattarSource {
    /// Build against the production API.
    ///
    /// # Errors
    /// Returns `SpotError::InvalidArg` for an unsupported market area, or `SpotError::Other`
    /// if the HTTP client cannot be built.
    pub fn new(market_area: &str) -> Result<Self, SpotError> {
        let api: Arc<dyn AwattarApi> = Arc::new(RealAdapter::try_new_default()?);
        Self::with_api(market_area, api, Arc::new(SystemClock))
    }

    /// Build with an injected API and clock.
    ///
    /// # Errors
    /// Returns `SpotError::InvalidArg` for an unsupported market area.
    pub fn with_api(
        market_area: &str,
        api: Arc<dyn AwattarApi>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SpotError> {
        let tz = match market_area {
            "de" => chrono_tz::Europe::Berlin,
            "at" => chrono_tz::Europe::Vienna,
            other => {
                return Err(SpotError::InvalidArg(format!(
                    "{NAME} does not serve market area {other:?}"
                )));
            }
        };
        Ok(Self {
            api,
            clock,
            market_area: market_area.to_string(),
            tz,
        })
    }

    /// Requested window: yesterday 00:00 local through local midnight three days later, as
    /// epoch millis.
    fn window(&self) -> (i64, i64) {
        let today = local_date(self.tz, self.clock.now());
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let start = local_midnight(self.tz, yesterday);
        let end = yesterday
            .checked_add_days(Days::new(3))
            .map_or(start, |last| local_midnight(self.tz, last));
        (start.timestamp_millis(), end.timestamp_millis())
    }

    fn extract(entry: &AwattarEntry) -> Result<Marketprice, SpotError> {
        PriceUnit::ensure_declared(&entry.unit, PriceUnit::EurPerMwh, NAME)?;
        let start = DateTime::from_timestamp_millis(entry.start_timestamp).ok_or_else(|| {
            SpotError::data_format(NAME, format!("bad start_timestamp {}", entry.start_timestamp))
        })?;
        let end = DateTime::from_timestamp_millis(entry.end_timestamp).ok_or_else(|| {
            SpotError::data_format(NAME, format!("bad end_timestamp {}", entry.end_timestamp))
        })?;
        let price = PriceUnit::EurPerMwh.convert(entry.marketprice, PriceUnit::EurPerKwh);
        Marketprice::new(start, end, price, PriceUnit::EurPerKwh)
            .map_err(|e| SpotError::data_format(NAME, e.to_string()))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "spotprice_sources::awattar::fetch",
            skip(self),
            fields(market_area = %self.market_area),
            err
        )
    )]
    async fn fetch_series(&self) -> Result<Vec<Marketprice>, SpotError> {
        let (start_ms, end_ms) = self.window();
        let resp = self.api.marketdata(&self.market_area, start_ms, end_ms).await?;
        let series = resp
            .data
            .iter()
            .map(Self::extract)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_chronological(&series, NAME)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(entries = series.len(), "extracted marketdata");
        Ok(series)
    }
}

#[async_trait]
impl PriceSource for AwattarSource {
    fn name(&self) -> &str {
        NAME
    }

    fn market_area(&self) -> &str {
        &self.market_area
    }

    fn duration(&self) -> u32 {
        60
    }

    async fn fetch_marketdata(&self) -> Result<Vec<Marketprice>, SpotError> {
        self.fetch_series().await
    }
}
