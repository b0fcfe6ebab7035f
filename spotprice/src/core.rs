use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use spotprice_core::{
    Marketprice, PriceSource, PricingOptions, SourceConfig, SpotError, SpotPriceConfig,
};

/// One configured price source together with its last published series.
///
/// `marketdata` is replaced wholesale by a successful [`SpotPrice::fetch`]; a failed or
/// timed-out fetch leaves the previous series visible.
pub struct SpotPrice {
    source: Arc<dyn PriceSource>,
    cfg: SpotPriceConfig,
    marketdata: Vec<Marketprice>,
}

/// Builder for constructing a [`SpotPrice`] with custom configuration.
pub struct SpotPriceBuilder {
    source: Option<Arc<dyn PriceSource>>,
    cfg: SpotPriceConfig,
}

impl Default for SpotPriceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotPriceBuilder {
    /// Create a new builder with a 10 s fetch timeout and default pricing options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            cfg: SpotPriceConfig::default(),
        }
    }

    /// Set the price source. Registering a second source replaces the first.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: SpotPriceConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the timeout applied to every fetch.
    ///
    /// Behavior and trade-offs:
    /// - A fetch that exceeds it is cancelled and reported as `SpotError::Timeout`.
    /// - The previous series stays published, so a short timeout trades freshness for
    ///   responsiveness.
    #[must_use]
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.fetch_timeout = timeout;
        self
    }

    /// Set surcharge and tax used by the net price helpers.
    #[must_use]
    pub const fn pricing(mut self, pricing: PricingOptions) -> Self {
        self.cfg.pricing = pricing;
        self
    }

    /// Build the [`SpotPrice`].
    ///
    /// # Errors
    /// Returns `InvalidArg` if no source was registered via [`with_source`](Self::with_source)
    /// or the fetch timeout is zero.
    pub fn build(self) -> Result<SpotPrice, SpotError> {
        let Some(source) = self.source else {
            return Err(SpotError::InvalidArg(
                "no price source registered; add one via with_source(...)".to_string(),
            ));
        };
        if self.cfg.fetch_timeout.is_zero() {
            return Err(SpotError::InvalidArg("fetch_timeout must be positive".to_string()));
        }
        Ok(SpotPrice {
            source,
            cfg: self.cfg,
            marketdata: Vec::new(),
        })
    }
}

impl SpotPrice {
    /// Start building a new `SpotPrice`.
    #[must_use]
    pub fn builder() -> SpotPriceBuilder {
        SpotPriceBuilder::new()
    }

    /// Wrap `source` with the given configuration.
    ///
    /// # Errors
    /// Same as [`SpotPriceBuilder::build`].
    pub fn new(source: Arc<dyn PriceSource>, cfg: SpotPriceConfig) -> Result<Self, SpotError> {
        Self::builder().with_source(source).config(cfg).build()
    }

    /// Build the adapter selected by `source_cfg` against the production endpoints.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an invalid source configuration, or `Other` if the HTTP client
    /// cannot be built.
    pub fn from_config(source_cfg: &SourceConfig, cfg: SpotPriceConfig) -> Result<Self, SpotError> {
        Self::new(spotprice_sources::from_config(source_cfg)?, cfg)
    }

    /// Wrap a source future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "spotprice::core::source_call_with_timeout",
            skip(fut),
            fields(timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
        )
    )]
    pub(crate) async fn source_call_with_timeout<T, Fut>(
        source_name: &str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, SpotError>
    where
        Fut: core::future::Future<Output = Result<T, SpotError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(SpotError::timeout(source_name)))
    }

    /// Fetch fresh data from the source and publish it.
    ///
    /// On success the published series is replaced as a whole and its length returned. On
    /// failure nothing is published: previous data stays visible, and after a first-ever
    /// failure `marketdata` stays empty. Errors are returned unmodified and never retried.
    ///
    /// # Errors
    /// `Fetch` or `Timeout` for transport problems, `DataFormat` for unusable payloads.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "spotprice::core::fetch",
            skip(self),
            fields(source = %self.source.name(), market_area = %self.source.market_area()),
        )
    )]
    pub async fn fetch(&mut self) -> Result<usize, SpotError> {
        let source = Arc::clone(&self.source);
        let res = Self::source_call_with_timeout(
            source.name(),
            self.cfg.fetch_timeout,
            source.fetch_marketdata(),
        )
        .await;
        match res {
            Ok(series) => {
                #[cfg(feature = "tracing")]
                tracing::info!(intervals = series.len(), "published marketdata");
                self.marketdata = series;
                Ok(self.marketdata.len())
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    error = %e,
                    kept = self.marketdata.len(),
                    "fetch failed; keeping previous marketdata"
                );
                Err(e)
            }
        }
    }

    /// Last successfully fetched series, ascending by start time.
    #[must_use]
    pub fn marketdata(&self) -> &[Marketprice] {
        &self.marketdata
    }

    /// The underlying source.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn PriceSource> {
        &self.source
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SpotPriceConfig {
        &self.cfg
    }

    /// Display name of the source.
    #[must_use]
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Market area served.
    #[must_use]
    pub fn market_area(&self) -> &str {
        self.source.market_area()
    }

    /// Nominal interval length in minutes.
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.source.duration()
    }

    /// ISO currency code of the prices.
    #[must_use]
    pub fn currency(&self) -> &str {
        self.source.currency()
    }

    /// Interval containing `at`, if any.
    #[must_use]
    pub fn current(&self, at: DateTime<Utc>) -> Option<&Marketprice> {
        // ascending and non-overlapping, so at most one interval can start at or before `at`
        // and still contain it
        let idx = self.marketdata.partition_point(|m| m.start_time() <= at);
        idx.checked_sub(1)
            .map(|i| &self.marketdata[i])
            .filter(|m| m.contains(at))
    }

    /// Cheapest interval; the earliest one wins a tie.
    #[must_use]
    pub fn lowest(&self) -> Option<&Marketprice> {
        self.marketdata.iter().reduce(|best, m| {
            if m.price_eur_per_kwh() < best.price_eur_per_kwh() {
                m
            } else {
                best
            }
        })
    }

    /// Most expensive interval; the earliest one wins a tie.
    #[must_use]
    pub fn highest(&self) -> Option<&Marketprice> {
        self.marketdata.iter().reduce(|best, m| {
            if m.price_eur_per_kwh() > best.price_eur_per_kwh() {
                m
            } else {
                best
            }
        })
    }

    /// Net price in ct/kWh at `at`, after the configured surcharge and tax.
    #[must_use]
    pub fn net_price_ct_per_kwh(&self, at: DateTime<Utc>) -> Option<Decimal> {
        self.current(at)
            .map(|m| m.net_price_ct_per_kwh(&self.cfg.pricing))
    }
}
