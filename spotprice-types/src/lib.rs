//! Spotprice-specific error, configuration, and source descriptor types shared by every crate
//! in the workspace.
#![warn(missing_docs)]

mod config;
mod error;
mod source;

pub use config::{Credentials, PricingOptions, SourceConfig, SpotPriceConfig};
pub use error::SpotError;
pub use source::Source;
