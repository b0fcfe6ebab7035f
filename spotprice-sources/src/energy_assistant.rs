use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use spotprice_core::clock::{is_dst, local_date};
use spotprice_core::{
    Clock, Credentials, Marketprice, PriceSource, PriceUnit, Source, SpotError, SystemClock,
    ensure_chronological,
};

use crate::adapter::{EnergyAssistantApi, RealAdapter};
use crate::payload::EnergyAssistantValue;

const NAME: &str = Source::EnergyAssistant.display_name();

/// Zone whose wall clock the provider's timestamps carry.
const PROVIDER_TZ: Tz = chrono_tz::Europe::Berlin;

/// Energy Assistant stock market prices.
///
/// Requires a token login before every data request. Timestamps arrive labelled UTC while
/// holding German local time, so each start is shifted back by one hour, or two while
/// daylight-saving time is in effect at fetch time.
pub struct EnergyAssistantSource {
    api: Arc<dyn EnergyAssistantApi>,
    clock: Arc<dyn Clock>,
    market_area: String,
    credentials: Credentials,
}

impl EnergyAssistantSource {
    /// Build against the production API.
    ///
    /// # Errors
    /// Returns `SpotError::InvalidArg` for an unsupported market area, or `SpotError::Other`
    /// if the HTTP client cannot be built.
    pub fn new(market_area: &str, credentials: Credentials) -> Result<Self, SpotError> {
        let api: Arc<dyn EnergyAssistantApi> = Arc::new(RealAdapter::try_new_default()?);
        Self::with_api(market_area, credentials, api, Arc::new(SystemClock))
    }

    /// Build with an injected API and clock.
    ///
    /// # Errors
    /// Returns `SpotError::InvalidArg` for an unsupported market area.
    pub fn with_api(
        market_area: &str,
        credentials: Credentials,
        api: Arc<dyn EnergyAssistantApi>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SpotError> {
        if !Source::EnergyAssistant.supports_market_area(market_area) {
            return Err(SpotError::InvalidArg(format!(
                "{NAME} does not serve market area {market_area:?}"
            )));
        }
        Ok(Self {
            api,
            clock,
            market_area: market_area.to_string(),
            credentials,
        })
    }

    /// Offset between the provider's mislabelled timestamps and real UTC.
    fn correction(now: DateTime<Utc>) -> TimeDelta {
        if is_dst(PROVIDER_TZ, now) {
            TimeDelta::hours(2)
        } else {
            TimeDelta::hours(1)
        }
    }

    fn extract(
        value: &EnergyAssistantValue,
        correction: TimeDelta,
    ) -> Result<Marketprice, SpotError> {
        if let Some(unit) = &value.unit {
            PriceUnit::ensure_declared(unit, PriceUnit::CtPerKwh, NAME)?;
        }
        let start = value.datetime.with_timezone(&Utc) - correction;
        Marketprice::with_duration(start, 60, value.price, PriceUnit::CtPerKwh)
            .map_err(|e| SpotError::data_format(NAME, e.to_string()))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "spotprice_sources::energy_assistant::fetch",
            skip(self),
            fields(market_area = %self.market_area),
            err
        )
    )]
    async fn fetch_series(&self) -> Result<Vec<Marketprice>, SpotError> {
        let token = self.api.login(&self.market_area, &self.credentials).await?;

        let now = self.clock.now();
        let start = local_date(PROVIDER_TZ, now).and_time(NaiveTime::MIN);
        let end = start
            .checked_add_days(Days::new(2))
            .ok_or_else(|| SpotError::InvalidArg(format!("date range overflows at {start}")))?;
        let resp = self
            .api
            .mapped_values(&self.market_area, &token, start, end)
            .await?;

        let correction = Self::correction(now);
        let series = resp
            .values
            .iter()
            .map(|v| Self::extract(v, correction))
            .collect::<Result<Vec<_>, _>>()?;
        ensure_chronological(&series, NAME)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            entries = series.len(),
            correction_hours = correction.num_hours(),
            "extracted marketdata"
        );
        Ok(series)
    }
}

#[async_trait]
impl PriceSource for EnergyAssistantSource {
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
