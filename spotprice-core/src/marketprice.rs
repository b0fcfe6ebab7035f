use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{PricingOptions, SpotError};

/// Price units seen in provider payloads.
///
/// Only [`PriceUnit::CtPerKwh`] and [`PriceUnit::EurPerKwh`] are canonical, i.e. may be the
/// stored unit of a [`Marketprice`]. `EurPerMwh` is accepted as a declared unit and converted
/// once during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriceUnit {
    /// Euro cents per kilowatt-hour.
    #[serde(rename = "ct/kWh")]
    CtPerKwh,
    /// Euro per kilowatt-hour.
    #[serde(rename = "EUR/kWh")]
    EurPerKwh,
    /// Euro per megawatt-hour.
    #[serde(rename = "EUR/MWh")]
    EurPerMwh,
}

impl PriceUnit {
    /// Parse a provider-declared unit label, ignoring ASCII case (`"Eur/MWh"`, `"ct/kWh"`).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        [Self::CtPerKwh, Self::EurPerKwh, Self::EurPerMwh]
            .into_iter()
            .find(|u| u.symbol().eq_ignore_ascii_case(label))
    }

    /// Canonical label for the unit.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::CtPerKwh => "ct/kWh",
            Self::EurPerKwh => "EUR/kWh",
            Self::EurPerMwh => "EUR/MWh",
        }
    }

    /// Whether a `Marketprice` may store its price in this unit.
    #[must_use]
    pub const fn is_canonical(self) -> bool {
        matches!(self, Self::CtPerKwh | Self::EurPerKwh)
    }

    /// How many of this unit make up 1 EUR/kWh.
    fn per_eur_per_kwh(self) -> Decimal {
        match self {
            Self::CtPerKwh => Decimal::ONE_HUNDRED,
            Self::EurPerKwh => Decimal::ONE,
            Self::EurPerMwh => Decimal::ONE_THOUSAND,
        }
    }

    /// Convert `value` expressed in `self` into `target`.
    #[must_use]
    pub fn convert(self, value: Decimal, target: Self) -> Decimal {
        if self == target {
            return value;
        }
        value / self.per_eur_per_kwh() * target.per_eur_per_kwh()
    }

    /// Fail unless the payload-declared `label` names `expected`.
    ///
    /// # Errors
    /// Returns `SpotError::DataFormat` attributed to `provider` when the label is unknown or
    /// names a different unit.
    pub fn ensure_declared(label: &str, expected: Self, provider: &str) -> Result<(), SpotError> {
        match Self::parse(label) {
            Some(u) if u == expected => Ok(()),
            _ => Err(SpotError::data_format(
                provider,
                format!("declared unit {label:?}, expected {}", expected.symbol()),
            )),
        }
    }
}

impl fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Price valid over the half-open interval `[start_time, end_time)`.
///
/// Values are immutable once built; `end_time` is only ever extended inside
/// [`compress_marketdata`](crate::compress_marketdata), which produces new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marketprice {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    price: Decimal,
    unit: PriceUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    interpolated: Option<bool>,
}

impl Marketprice {
    /// Build an interval with an explicit end.
    ///
    /// # Errors
    /// Returns `SpotError::InvalidArg` if `unit` is not canonical or `end_time <= start_time`.
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        price: Decimal,
        unit: PriceUnit,
    ) -> Result<Self, SpotError> {
        if !unit.is_canonical() {
            return Err(SpotError::InvalidArg(format!(
                "{unit} is not a canonical storage unit"
            )));
        }
        if end_time <= start_time {
            return Err(SpotError::InvalidArg(format!(
                "interval end {end_time} is not after start {start_time}"
            )));
        }
        Ok(Self {
            start_time,
            end_time,
            price,
            unit,
            interpolated: None,
        })
    }

    /// Build an interval lasting `minutes` from `start_time`.
    ///
    /// # Errors
    /// Same as [`Marketprice::new`]; a zero or negative duration is rejected, as is one whose
    /// end is not representable.
    pub fn with_duration(
        start_time: DateTime<Utc>,
        minutes: i64,
        price: Decimal,
        unit: PriceUnit,
    ) -> Result<Self, SpotError> {
        let end_time = TimeDelta::try_minutes(minutes)
            .and_then(|d| start_time.checked_add_signed(d))
            .ok_or_else(|| {
                SpotError::InvalidArg(format!(
                    "interval of {minutes} minutes from {start_time} is out of range"
                ))
            })?;
        Self::new(start_time, end_time, price, unit)
    }

    /// Attach the provider's "estimated value" flag.
    #[must_use]
    pub fn interpolated(mut self, flag: Option<bool>) -> Self {
        self.interpolated = flag;
        self
    }

    /// Used by the compressor when closing a run; the run upholds every invariant.
    pub(crate) const fn from_parts(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        price: Decimal,
        unit: PriceUnit,
        interpolated: Option<bool>,
    ) -> Self {
        Self {
            start_time,
            end_time,
            price,
            unit,
            interpolated,
        }
    }

    /// Inclusive start of the interval.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Exclusive end of the interval.
    #[must_use]
    pub const fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Length of the interval.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    /// Whether `at` falls inside `[start_time, end_time)`.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_time <= at && at < self.end_time
    }

    /// Stored price, in [`Marketprice::unit`].
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Canonical unit the price is stored in.
    #[must_use]
    pub const fn unit(&self) -> PriceUnit {
        self.unit
    }

    /// Provider flag marking the value as estimated; `None` when the source does not say.
    #[must_use]
    pub const fn is_interpolated(&self) -> Option<bool> {
        self.interpolated
    }

    /// Exact price in EUR/kWh.
    #[must_use]
    pub fn price_eur_per_kwh(&self) -> Decimal {
        self.unit.convert(self.price, PriceUnit::EurPerKwh)
    }

    /// Price in ct/kWh, rounded to 2 decimals.
    #[must_use]
    pub fn price_ct_per_kwh(&self) -> Decimal {
        (self.price_eur_per_kwh() * Decimal::ONE_HUNDRED).round_dp(2)
    }

    /// Price in EUR/MWh, rounded to 2 decimals.
    #[must_use]
    pub fn price_eur_per_mwh(&self) -> Decimal {
        (self.price_eur_per_kwh() * Decimal::ONE_THOUSAND).round_dp(2)
    }

    /// Price after surcharge and tax, in EUR/kWh.
    #[must_use]
    pub fn net_price_eur_per_kwh(&self, pricing: &PricingOptions) -> Decimal {
        pricing.net_eur_per_kwh(self.price_eur_per_kwh())
    }

    /// Price after surcharge and tax, in ct/kWh rounded to 2 decimals.
    #[must_use]
    pub fn net_price_ct_per_kwh(&self, pricing: &PricingOptions) -> Decimal {
        (self.net_price_eur_per_kwh(pricing) * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

impl fmt::Display for Marketprice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Marketprice(start: {}, end: {}, marketprice: {} {})",
            self.start_time.to_rfc3339(),
            self.end_time.to_rfc3339(),
            self.price,
            self.unit
        )
    }
}
