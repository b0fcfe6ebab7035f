use std::time::Duration;

use chrono::{DateTime, Utc};
use spotprice::{SpotError, SpotPrice, SpotPriceConfig, refresh_all};
use spotprice_mock::fixtures::series_ct;
use spotprice_mock::{MockBehavior, MockSource};

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[tokio::test(start_paused = true)]
async fn instances_refresh_independently() {
    let cfg = SpotPriceConfig {
        fetch_timeout: Duration::from_secs(5),
        ..SpotPriceConfig::default()
    };

    let (ok_src, ok_ctl) = MockSource::new_with_controller("ok", "de");
    ok_ctl
        .set_behavior(MockBehavior::Return(series_ct(start(), 60, &[1, 2])))
        .await;
    let (bad_src, bad_ctl) = MockSource::new_with_controller("bad", "at");
    bad_ctl
        .set_behavior(MockBehavior::Fail(SpotError::fetch("bad", "connection reset")))
        .await;
    let (slow_src, slow_ctl) = MockSource::new_with_controller("slow", "de");
    slow_ctl.set_behavior(MockBehavior::Hang).await;

    let mut all = vec![
        SpotPrice::new(ok_src, cfg.clone()).unwrap(),
        SpotPrice::new(bad_src, cfg.clone()).unwrap(),
        SpotPrice::new(slow_src, cfg).unwrap(),
    ];
    let results = refresh_all(&mut all).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Ok(2));
    assert_eq!(results[1], Err(SpotError::fetch("bad", "connection reset")));
    assert_eq!(results[2], Err(SpotError::timeout("slow")));
    assert_eq!(all[0].marketdata().len(), 2);
    assert!(all[1].marketdata().is_empty());
    assert!(all[2].marketdata().is_empty());
}

#[tokio::test]
async fn empty_slice_is_a_no_op() {
    let results = refresh_all(&mut []).await;
    assert!(results.is_empty());
}
