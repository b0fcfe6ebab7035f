//! spotprice-core
//!
//! Core types, traits, and utilities shared across the spotprice workspace.
//!
//! - `marketprice`: the canonical interval model and its unit views.
//! - `connector`: the `PriceSource` trait every provider adapter implements.
//! - `clock`: injectable wall clock plus timezone helpers used by adapters.
//! - `timeseries`: interval compression and series validation.
#![warn(missing_docs)]

/// Wall clock abstraction and local-time helpers.
pub mod clock;
/// The `PriceSource` trait implemented by provider adapters.
pub mod connector;
/// Canonical price interval and unit conversions.
pub mod marketprice;
/// Time-series utilities for compressing and validating interval series.
pub mod timeseries;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use connector::PriceSource;
pub use marketprice::{Marketprice, PriceUnit};
pub use timeseries::compress::{compress_marketdata, is_compressed};
pub use timeseries::util::ensure_chronological;
pub use types::*;
