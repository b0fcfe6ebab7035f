use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the spotprice workspace.
///
/// Transport failures and payload problems are kept apart so callers can tell
/// a flaky network from a provider that changed its format.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpotError {
    /// Network/transport failure or a non-success HTTP status during login or data retrieval.
    #[error("{provider} fetch failed: {msg}")]
    Fetch {
        /// Name of the price source that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The payload is missing expected fields, declares an unexpected unit, or is not a
    /// well-formed chronological series.
    #[error("{provider} returned malformed data: {msg}")]
    DataFormat {
        /// Name of the price source that produced the payload.
        provider: String,
        /// Description of the format problem.
        msg: String,
    },

    /// A fetch exceeded the configured timeout and was cancelled.
    #[error("{provider} fetch timed out")]
    Timeout {
        /// Name of the price source that timed out.
        provider: String,
    },

    /// Invalid input argument (unknown market area, missing credentials, bad interval).
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl SpotError {
    /// Helper: build a `Fetch` error with the provider name and message.
    pub fn fetch(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `DataFormat` error with the provider name and message.
    pub fn data_format(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::DataFormat {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Timeout` error.
    pub fn timeout(provider: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
        }
    }

    /// Returns true for transport-level failures, including timeouts.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Timeout { .. })
    }

    /// Returns true when the provider answered but the payload could not be normalized.
    #[must_use]
    pub const fn is_data_format(&self) -> bool {
        matches!(self, Self::DataFormat { .. })
    }

    /// Name of the provider this error is attributed to, if any.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Fetch { provider, .. }
            | Self::DataFormat { provider, .. }
            | Self::Timeout { provider } => Some(provider),
            Self::InvalidArg(_) | Self::Other(_) => None,
        }
    }
}
