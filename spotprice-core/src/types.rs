//! Re-export of foundational types from `spotprice-types`.
// Consolidated re-exports so downstream crates can depend on `spotprice-core` only

pub use spotprice_types::{Credentials, PricingOptions, SourceConfig, SpotPriceConfig};
pub use spotprice_types::{Source, SpotError};

pub use chrono::{DateTime, TimeDelta, Utc};
pub use rust_decimal::Decimal;
