#![cfg(feature = "tracing")]

use std::io;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use spotprice::{SpotError, SpotPrice, SpotPriceConfig};
use spotprice_mock::fixtures::series_ct;
use spotprice_mock::{MockBehavior, MockSource};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn fetch_logs_outcome_inside_its_span() {
    let out = Captured::default();
    let _guard = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("spotprice=debug"))
        .with_writer(out.clone())
        .with_ansi(false)
        .finish()
        .set_default();

    let start: DateTime<Utc> = DateTime::parse_from_rfc3339("2024-03-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let (source, controller) = MockSource::new_with_controller("mock", "de");
    controller
        .push_behavior(MockBehavior::Return(series_ct(start, 15, &[1, 1])))
        .await;
    controller
        .push_behavior(MockBehavior::Fail(SpotError::Other("boom".into())))
        .await;

    let mut sp = SpotPrice::new(source, SpotPriceConfig::default()).unwrap();
    assert_eq!(sp.fetch().await, Ok(2));
    assert!(sp.fetch().await.is_err());
    assert_eq!(sp.marketdata().len(), 2);

    let logs = out.text();
    assert!(logs.contains("spotprice::core::fetch"), "{logs}");
    assert!(logs.contains("market_area=de"), "{logs}");
    assert!(logs.contains("intervals=2"), "{logs}");
    assert!(logs.contains("published marketdata"), "{logs}");
    assert!(logs.contains("kept=2"), "{logs}");
    assert!(logs.contains("unknown error: boom"), "{logs}");
}
