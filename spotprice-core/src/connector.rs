use async_trait::async_trait;

use crate::{Marketprice, SpotError};

/// Common contract of every provider adapter.
///
/// Implementations fetch one provider payload and normalize it into an ascending,
/// non-overlapping series. They hold no published state: keeping the last good series and
/// replacing it atomically is the facade's job.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Display name of the provider.
    fn name(&self) -> &str;

    /// Configured market area.
    fn market_area(&self) -> &str;

    /// Nominal length in minutes of the intervals this source publishes.
    fn duration(&self) -> u32;

    /// Settlement currency.
    fn currency(&self) -> &'static str {
        "EUR"
    }

    /// Fetch and normalize the current price series.
    ///
    /// # Errors
    /// `SpotError::Fetch` for transport failures and non-success statuses,
    /// `SpotError::DataFormat` for payloads that cannot be normalized.
    async fn fetch_marketdata(&self) -> Result<Vec<Marketprice>, SpotError>;
}
