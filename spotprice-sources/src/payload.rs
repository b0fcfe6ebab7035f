//! Raw provider payloads, decoded as-is before normalization.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;

/// `GET /v1/marketdata` response of aWATTar.
#[derive(Debug, Clone, Deserialize)]
pub struct AwattarResponse {
    /// Hourly entries.
    pub data: Vec<AwattarEntry>,
}

/// One aWATTar market data entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AwattarEntry {
    /// Interval start, epoch milliseconds.
    pub start_timestamp: i64,
    /// Interval end, epoch milliseconds.
    pub end_timestamp: i64,
    /// Price in `unit`.
    pub marketprice: Decimal,
    /// Declared unit, `Eur/MWh` in practice.
    pub unit: String,
}

/// Stadtwerk Haßfurt EEX price response.
#[derive(Debug, Clone, Deserialize)]
pub struct StwHasResponse {
    /// Resolution of `data` in minutes.
    pub interval: i64,
    /// Declared unit of every price in `data`.
    pub unit: String,
    /// Price records.
    pub data: Vec<StwHasEexValue>,
}

/// One Stadtwerk Haßfurt price record.
#[derive(Debug, Clone, Deserialize)]
pub struct StwHasEexValue {
    /// Interval start with offset.
    pub datetime: DateTime<FixedOffset>,
    /// Price in the response's `unit`.
    pub price: Decimal,
    /// Set when the provider estimated the value.
    #[serde(default)]
    pub interpolated: Option<bool>,
}

/// Energy Assistant login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Energy Assistant mapped stock market values.
#[derive(Debug, Clone, Deserialize)]
pub struct EnergyAssistantResponse {
    /// Hourly values.
    pub values: Vec<EnergyAssistantValue>,
}

/// One Energy Assistant value.
///
/// `datetime` is labelled UTC but carries German wall-clock time.
#[derive(Debug, Clone, Deserialize)]
pub struct EnergyAssistantValue {
    /// Interval start as sent by the provider.
    pub datetime: DateTime<FixedOffset>,
    /// Price in ct/kWh.
    pub price: Decimal,
    /// Declared unit, when the provider sends one.
    #[serde(default)]
    pub unit: Option<String>,
}
