use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use spotprice_core::{FixedClock, PriceSource, PriceUnit, SpotError};
use spotprice_sources::AwattarSource;
use spotprice_sources::adapter::AwattarApi;
use spotprice_sources::payload::AwattarResponse;

fn dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(dt("2024-03-15T12:00:00Z")))
}

fn response(entries: serde_json::Value) -> AwattarResponse {
    serde_json::from_value(json!({ "object": "list", "data": entries, "url": "/de/v1/marketdata" }))
        .expect("valid awattar payload")
}

#[tokio::test]
async fn converts_mwh_to_kwh_once() {
    let api = <dyn AwattarApi>::from_fn(|_, _, _| {
        Ok(response(json!([
            { "start_timestamp": 1_710_457_200_000i64, "end_timestamp": 1_710_460_800_000i64, "marketprice": 87.31, "unit": "Eur/MWh" },
            { "start_timestamp": 1_710_460_800_000i64, "end_timestamp": 1_710_464_400_000i64, "marketprice": -5.0, "unit": "Eur/MWh" }
        ])))
    });
    let src = AwattarSource::with_api("de", api, clock()).unwrap();
    let data = src.fetch_marketdata().await.unwrap();

    assert_eq!(data.len(), 2);
    assert_eq!(data[0].unit(), PriceUnit::EurPerKwh);
    assert_eq!(data[0].price(), "0.08731".parse::<Decimal>().unwrap());
    assert_eq!(data[0].price_eur_per_mwh(), "87.31".parse::<Decimal>().unwrap());
    assert_eq!(data[0].price_ct_per_kwh(), "8.73".parse::<Decimal>().unwrap());
    assert_eq!(data[0].start_time(), dt("2024-03-14T23:00:00Z"));
    assert_eq!(data[0].end_time(), dt("2024-03-15T00:00:00Z"));
    assert_eq!(data[1].price_ct_per_kwh(), "-0.5".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn requests_yesterday_through_three_days_local() {
    let seen = Arc::new(Mutex::new(None));
    let seen_in = Arc::clone(&seen);
    let api = <dyn AwattarApi>::from_fn(move |area, start, end| {
        *seen_in.lock().unwrap() = Some((area.to_string(), start, end));
        Ok(response(json!([])))
    });
    let src = AwattarSource::with_api("de", api, clock()).unwrap();
    assert!(src.fetch_marketdata().await.unwrap().is_empty());

    let (area, start, end) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(area, "de");
    // 2024-03-14 00:00 Europe/Berlin (CET)
    assert_eq!(start, 1_710_370_800_000);
    assert_eq!(end - start, 3 * 24 * 3_600_000);
}

#[tokio::test]
async fn window_ends_at_local_midnight_across_dst_switch() {
    let seen = Arc::new(Mutex::new(None));
    let seen_in = Arc::clone(&seen);
    let api = <dyn AwattarApi>::from_fn(move |_, start, end| {
        *seen_in.lock().unwrap() = Some((start, end));
        Ok(response(json!([])))
    });
    // clocks go forward on 2024-03-31 in Berlin
    let clock = Arc::new(FixedClock(dt("2024-03-30T12:00:00Z")));
    let src = AwattarSource::with_api("de", api, clock).unwrap();
    src.fetch_marketdata().await.unwrap();

    let (start, end) = seen.lock().unwrap().unwrap();
    assert_eq!(start, dt("2024-03-28T23:00:00Z").timestamp_millis());
    assert_eq!(end, dt("2024-03-31T22:00:00Z").timestamp_millis());
    assert_eq!(end - start, 71 * 3_600_000);
}

#[tokio::test]
async fn unit_mismatch_is_data_format() {
    let api = <dyn AwattarApi>::from_fn(|_, _, _| {
        Ok(response(json!([
            { "start_timestamp": 0, "end_timestamp": 3_600_000, "marketprice": 1.0, "unit": "ct/kWh" }
        ])))
    });
    let src = AwattarSource::with_api("at", api, clock()).unwrap();
    let err = src.fetch_marketdata().await.unwrap_err();
    assert!(err.is_data_format());
    assert_eq!(err.provider(), Some("Awattar"));
}

#[tokio::test]
async fn inverted_interval_is_data_format() {
    let api = <dyn AwattarApi>::from_fn(|_, _, _| {
        Ok(response(json!([
            { "start_timestamp": 3_600_000, "end_timestamp": 3_600_000, "marketprice": 1.0, "unit": "Eur/MWh" }
        ])))
    });
    let src = AwattarSource::with_api("de", api, clock()).unwrap();
    assert!(src.fetch_marketdata().await.unwrap_err().is_data_format());
}

#[tokio::test]
async fn overlapping_entries_are_rejected() {
    let api = <dyn AwattarApi>::from_fn(|_, _, _| {
        Ok(response(json!([
            { "start_timestamp": 0, "end_timestamp": 3_600_000, "marketprice": 1.0, "unit": "Eur/MWh" },
            { "start_timestamp": 1_800_000, "end_timestamp": 5_400_000, "marketprice": 1.0, "unit": "Eur/MWh" }
        ])))
    });
    let src = AwattarSource::with_api("de", api, clock()).unwrap();
    assert!(src.fetch_marketdata().await.unwrap_err().is_data_format());
}

#[tokio::test]
async fn transport_errors_pass_through() {
    let api =
        <dyn AwattarApi>::from_fn(|_, _, _| Err(SpotError::fetch("Awattar", "HTTP status 503")));
    let src = AwattarSource::with_api("de", api, clock()).unwrap();
    let err = src.fetch_marketdata().await.unwrap_err();
    assert_eq!(err, SpotError::fetch("Awattar", "HTTP status 503"));
}

#[test]
fn descriptors_and_market_area_validation() {
    let api = <dyn AwattarApi>::from_fn(|_, _, _| Ok(response(json!([]))));
    let src = AwattarSource::with_api("at", Arc::clone(&api), clock()).unwrap();
    assert_eq!(src.name(), "Awattar");
    assert_eq!(src.market_area(), "at");
    assert_eq!(src.duration(), 60);
    assert_eq!(src.currency(), "EUR");
    assert!(matches!(
        AwattarSource::with_api("fr", api, clock()),
        Err(SpotError::InvalidArg(_))
    ));
}
