//! Deterministic series for tests.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use spotprice_core::{Marketprice, PriceUnit};

/// Contiguous intervals of `minutes` each starting at `start`, one per price, in ct/kWh.
///
/// # Panics
/// Panics if `minutes` is not positive.
#[must_use]
pub fn series_ct(start: DateTime<Utc>, minutes: i64, prices: &[i64]) -> Vec<Marketprice> {
    let step = TimeDelta::minutes(minutes);
    let mut at = start;
    prices
        .iter()
        .map(|p| {
            let entry =
                Marketprice::with_duration(at, minutes, Decimal::from(*p), PriceUnit::CtPerKwh)
                    .expect("fixture intervals have positive length");
            at += step;
            entry
        })
        .collect()
}

/// A full day of hourly prices starting at `start`, cheapest at 03:00 and dearest at 18:00.
#[must_use]
pub fn hourly_day(start: DateTime<Utc>) -> Vec<Marketprice> {
    const PROFILE: [i64; 24] = [
        21, 19, 18, 12, 15, 17, 24, 29, 31, 27, 22, 20, 18, 17, 19, 23, 28, 33, 41, 36, 30, 26, 24,
        22,
    ];
    series_ct(start, 60, &PROFILE)
}
