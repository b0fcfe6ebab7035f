use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use spotprice_core::{Credentials, FixedClock, PriceSource, PriceUnit, SpotError};
use spotprice_sources::EnergyAssistantSource;
use spotprice_sources::adapter::EnergyAssistantApi;
use spotprice_sources::payload::EnergyAssistantResponse;

fn dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn creds() -> Credentials {
    Credentials::new("user@example.com", "secret")
}

fn values(v: serde_json::Value) -> EnergyAssistantResponse {
    serde_json::from_value(json!({ "values": v })).expect("valid energy assistant payload")
}

fn source_at(now: &str, resp: serde_json::Value) -> EnergyAssistantSource {
    let api = <dyn EnergyAssistantApi>::from_fns(
        |_| Ok("tok".to_string()),
        move |_, _, _| Ok(values(resp.clone())),
    );
    EnergyAssistantSource::with_api("Haßfurt", creds(), api, Arc::new(FixedClock(dt(now))))
        .unwrap()
}

#[tokio::test]
async fn summer_fetch_shifts_back_two_hours() {
    let src = source_at(
        "2024-07-01T10:00:00Z",
        json!([{ "datetime": "2024-03-15T00:00:00Z", "price": 12.34, "unit": "ct/kWh" }]),
    );
    let data = src.fetch_marketdata().await.unwrap();

    assert_eq!(data.len(), 1);
    assert_eq!(data[0].start_time(), dt("2024-03-14T22:00:00Z"));
    assert_eq!(data[0].end_time(), dt("2024-03-14T23:00:00Z"));
    assert_eq!(data[0].price(), "12.34".parse::<Decimal>().unwrap());
    assert_eq!(data[0].unit(), PriceUnit::CtPerKwh);
    assert_eq!(data[0].price_eur_per_kwh(), "0.1234".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn winter_fetch_shifts_back_one_hour() {
    let src = source_at(
        "2024-01-10T10:00:00Z",
        json!([
            { "datetime": "2024-03-15T00:00:00Z", "price": 5 },
            { "datetime": "2024-03-15T01:00:00Z", "price": 6 }
        ]),
    );
    let data = src.fetch_marketdata().await.unwrap();

    assert_eq!(data.len(), 2);
    assert_eq!(data[0].start_time(), dt("2024-03-14T23:00:00Z"));
    assert_eq!(data[1].start_time(), dt("2024-03-15T00:00:00Z"));
    // no compression for this source
    assert_eq!(data[1].price(), Decimal::from(6));
}

#[tokio::test]
async fn token_and_local_date_range_reach_the_api() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in = Arc::clone(&seen);
    let api = <dyn EnergyAssistantApi>::from_fns(
        |c| {
            assert_eq!(c.username, "user@example.com");
            Ok("bearer-123".to_string())
        },
        move |token, start, end| {
            seen_in.lock().unwrap().push((token.to_string(), start, end));
            Ok(values(json!([])))
        },
    );
    // 23:30 UTC is already the next day in Berlin
    let clock = Arc::new(FixedClock(dt("2024-06-30T23:30:00Z")));
    let src = EnergyAssistantSource::with_api("Haßfurt", creds(), api, clock).unwrap();
    assert!(src.fetch_marketdata().await.unwrap().is_empty());

    let calls = seen.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![("bearer-123".to_string(), midnight(2024, 7, 1), midnight(2024, 7, 3))]
    );
}

#[tokio::test]
async fn login_failure_skips_data_request() {
    let data_called = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&data_called);
    let api = <dyn EnergyAssistantApi>::from_fns(
        |_| Err(SpotError::fetch("Energy Assistant", "HTTP status 401 Unauthorized")),
        move |_, _, _| {
            *flag.lock().unwrap() = true;
            Ok(values(json!([])))
        },
    );
    let clock = Arc::new(FixedClock(dt("2024-07-01T10:00:00Z")));
    let src = EnergyAssistantSource::with_api("Haßfurt", creds(), api, clock).unwrap();

    let err = src.fetch_marketdata().await.unwrap_err();
    assert!(err.is_fetch());
    assert!(!*data_called.lock().unwrap());
}

#[tokio::test]
async fn declared_unit_is_checked_when_present() {
    let src = source_at(
        "2024-07-01T10:00:00Z",
        json!([{ "datetime": "2024-03-15T00:00:00Z", "price": 120.0, "unit": "EUR/MWh" }]),
    );
    let err = src.fetch_marketdata().await.unwrap_err();
    assert!(err.is_data_format());
    assert_eq!(err.provider(), Some("Energy Assistant"));
}

#[tokio::test]
async fn duplicate_hours_are_rejected() {
    let src = source_at(
        "2024-07-01T10:00:00Z",
        json!([
            { "datetime": "2024-03-15T00:00:00Z", "price": 1 },
            { "datetime": "2024-03-15T00:00:00Z", "price": 2 }
        ]),
    );
    assert!(src.fetch_marketdata().await.unwrap_err().is_data_format());
}

#[test]
fn descriptors() {
    let src = source_at("2024-07-01T10:00:00Z", json!([]));
    assert_eq!(src.name(), "Energy Assistant");
    assert_eq!(src.market_area(), "Haßfurt");
    assert_eq!(src.duration(), 60);
    assert_eq!(src.currency(), "EUR");
}
