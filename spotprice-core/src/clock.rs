use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

/// Source of "now" for adapters whose requests or corrections depend on the current date.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Whether daylight-saving time is in effect in `tz` at `at`.
#[must_use]
pub fn is_dst(tz: Tz, at: DateTime<Utc>) -> bool {
    !tz.offset_from_utc_datetime(&at.naive_utc())
        .dst_offset()
        .is_zero()
}

/// Calendar date in `tz` at `at`.
#[must_use]
pub fn local_date(tz: Tz, at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// Local midnight of `date` in `tz`, as a UTC instant.
///
/// Midnight is never skipped in the zones we serve; should a zone skip it, the same wall-clock
/// reading interpreted as UTC is returned.
#[must_use]
pub fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| Utc.from_utc_datetime(&naive), |d| d.with_timezone(&Utc))
}
