//! spotprice-mock
//!
//! A scriptable [`PriceSource`](spotprice_core::PriceSource) for exercising the facade without a
//! network, plus a few deterministic fixture series.

mod dynamic;
pub mod fixtures;

pub use dynamic::{MockBehavior, MockController, MockSource};
