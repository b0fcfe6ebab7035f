//! Configuration types shared by the facade and the source factory.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Source, SpotError};

/// Username/password pair for sources that authenticate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name (an e-mail address for Energy Assistant).
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Build a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-instance source selection, as persisted by a configuration flow.
///
/// The `source` tag is the discriminant that selects the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SourceConfig {
    /// aWATTar; no credentials.
    Awattar {
        /// Market area, one of `Source::Awattar.market_areas()`.
        market_area: String,
    },
    /// Stadtwerk Haßfurt.
    #[serde(rename = "stwhas")]
    StwHas {
        /// Market area, one of `Source::StwHas.market_areas()`.
        market_area: String,
        /// Account credentials.
        #[serde(flatten)]
        credentials: Credentials,
    },
    /// Energy Assistant.
    EnergyAssistant {
        /// Market area, one of `Source::EnergyAssistant.market_areas()`.
        market_area: String,
        /// Account credentials.
        #[serde(flatten)]
        credentials: Credentials,
    },
}

impl SourceConfig {
    /// The discriminant of this configuration.
    #[must_use]
    pub const fn source(&self) -> Source {
        match self {
            Self::Awattar { .. } => Source::Awattar,
            Self::StwHas { .. } => Source::StwHas,
            Self::EnergyAssistant { .. } => Source::EnergyAssistant,
        }
    }

    /// Configured market area.
    #[must_use]
    pub fn market_area(&self) -> &str {
        match self {
            Self::Awattar { market_area }
            | Self::StwHas { market_area, .. }
            | Self::EnergyAssistant { market_area, .. } => market_area,
        }
    }

    /// Credentials, for sources that carry them.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Awattar { .. } => None,
            Self::StwHas { credentials, .. } | Self::EnergyAssistant { credentials, .. } => {
                Some(credentials)
            }
        }
    }

    /// Check the market area against the source's list and require non-empty credentials
    /// where the source authenticates.
    ///
    /// # Errors
    /// Returns `SpotError::InvalidArg` describing the first problem found.
    pub fn validate(&self) -> Result<(), SpotError> {
        let source = self.source();
        if !source.supports_market_area(self.market_area()) {
            return Err(SpotError::InvalidArg(format!(
                "market area {:?} is not offered by {}",
                self.market_area(),
                source
            )));
        }
        if let Some(c) = self.credentials()
            && (c.username.trim().is_empty() || c.password.is_empty())
        {
            return Err(SpotError::InvalidArg(format!(
                "{source} requires a username and password"
            )));
        }
        Ok(())
    }
}

/// Surcharge and tax applied on top of the raw market price.
///
/// All amounts are percentages except `surcharge_abs`, which is in EUR/kWh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingOptions {
    /// Relative surcharge in percent of the market price.
    pub surcharge_perc: Decimal,
    /// Absolute surcharge in EUR/kWh.
    pub surcharge_abs: Decimal,
    /// Value added tax in percent.
    pub tax_perc: Decimal,
}

impl Default for PricingOptions {
    fn default() -> Self {
        Self {
            surcharge_perc: Decimal::new(30, 1),
            surcharge_abs: Decimal::new(1193, 4),
            tax_perc: Decimal::new(190, 1),
        }
    }
}

impl PricingOptions {
    /// Options that leave the market price untouched.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            surcharge_perc: Decimal::ZERO,
            surcharge_abs: Decimal::ZERO,
            tax_perc: Decimal::ZERO,
        }
    }

    /// Net price in EUR/kWh for a market price in EUR/kWh.
    ///
    /// The relative surcharge is taken on the magnitude of the market price so it never
    /// turns into a rebate when prices are negative.
    #[must_use]
    pub fn net_eur_per_kwh(&self, market_eur_per_kwh: Decimal) -> Decimal {
        let hundred = Decimal::ONE_HUNDRED;
        let relative = (market_eur_per_kwh * self.surcharge_perc / hundred).abs();
        let net = market_eur_per_kwh + relative + self.surcharge_abs;
        net * (Decimal::ONE + self.tax_perc / hundred)
    }
}

/// Facade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotPriceConfig {
    /// Upper bound for a single `fetch`, covering login and data retrieval.
    pub fetch_timeout: Duration,
    /// Surcharge/tax options used by net price views.
    pub pricing: PricingOptions,
}

impl Default for SpotPriceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            pricing: PricingOptions::default(),
        }
    }
}
