//! Price source descriptors usable across crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SpotError;

/// Discriminant selecting which provider adapter backs a configured instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Source {
    /// aWATTar day-ahead market data (Germany, Austria).
    Awattar,
    /// Stadtwerk Haßfurt EEX feed (15 minute resolution).
    #[serde(rename = "stwhas")]
    StwHas,
    /// Energy Assistant stock market API (token login).
    EnergyAssistant,
}

impl Source {
    /// Every supported source, in a stable order suitable for selection lists.
    pub const ALL: &'static [Self] = &[Self::Awattar, Self::EnergyAssistant, Self::StwHas];

    /// Stable machine key, identical to the serde representation.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Awattar => "awattar",
            Self::StwHas => "stwhas",
            Self::EnergyAssistant => "energy_assistant",
        }
    }

    /// Human-readable provider name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Awattar => "Awattar",
            Self::StwHas => "Stadtwerk Haßfurt API",
            Self::EnergyAssistant => "Energy Assistant",
        }
    }

    /// Market areas a configuration flow may offer for this source.
    #[must_use]
    pub const fn market_areas(self) -> &'static [&'static str] {
        match self {
            Self::Awattar => &["at", "de"],
            Self::StwHas | Self::EnergyAssistant => &["Haßfurt"],
        }
    }

    /// Whether the source needs a username and password.
    #[must_use]
    pub const fn requires_credentials(self) -> bool {
        matches!(self, Self::StwHas | Self::EnergyAssistant)
    }

    /// Returns true if `area` is one of [`Source::market_areas`].
    #[must_use]
    pub fn supports_market_area(self, area: &str) -> bool {
        self.market_areas().contains(&area)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Source {
    type Err = SpotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|src| src.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| SpotError::InvalidArg(format!("unknown source: {s}")))
    }
}
