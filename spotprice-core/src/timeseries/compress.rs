use chrono::{DateTime, TimeDelta, Utc};

use crate::Marketprice;

/// An interval that is still accepting contiguous equal-price arrivals.
///
/// Kept apart from `Marketprice` so a published value is never mutated.
struct Run {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    first: Marketprice,
    interpolated: Option<bool>,
}

impl Run {
    fn open(first: Marketprice) -> Self {
        Self {
            start_time: first.start_time(),
            end_time: first.end_time(),
            interpolated: first.is_interpolated(),
            first,
        }
    }

    /// Equal price, strictly contiguous, and still inside the run's first output slot.
    fn accepts(&self, next: &Marketprice, slot: TimeDelta) -> bool {
        let is_price_equal = self.first.price_eur_per_kwh() == next.price_eur_per_kwh();
        let is_continuation = self.end_time == next.start_time();
        let is_same_slot = next.start_time() < self.start_time + slot;
        is_price_equal && is_continuation && is_same_slot
    }

    fn extend(&mut self, next: &Marketprice) {
        self.end_time = next.end_time();
        self.interpolated = match (self.interpolated, next.is_interpolated()) {
            (None, None) => None,
            (a, b) => Some(a == Some(true) || b == Some(true)),
        };
    }

    fn close(self) -> Marketprice {
        Marketprice::from_parts(
            self.start_time,
            self.end_time,
            self.first.price(),
            self.first.unit(),
            self.interpolated,
        )
    }
}

/// Merge a chronological series of intervals into maximal contiguous runs of identical price.
///
/// A run never extends to an interval starting `slot` or more after the run's own start, so
/// every emitted interval begins within one output slot of the values it absorbed.
///
/// - Empty input yields empty output.
/// - A merged run is flagged interpolated if any absorbed interval was.
/// - The function is total: out-of-order input is not an error, it simply merges less.
///   Callers that need ordering guarantees validate with
///   [`ensure_chronological`](crate::ensure_chronological) first.
#[must_use]
pub fn compress_marketdata<I>(series: I, slot: TimeDelta) -> Vec<Marketprice>
where
    I: IntoIterator<Item = Marketprice>,
{
    let iter = series.into_iter();
    let mut out: Vec<Marketprice> = Vec::with_capacity(iter.size_hint().0);
    let mut run: Option<Run> = None;

    for entry in iter {
        if let Some(r) = run.as_mut()
            && r.accepts(&entry, slot)
        {
            r.extend(&entry);
            continue;
        }
        if let Some(done) = run.replace(Run::open(entry)) {
            out.push(done.close());
        }
    }
    if let Some(r) = run {
        out.push(r.close());
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "spotprice_core::compress",
        runs = out.len(),
        slot_minutes = slot.num_minutes(),
        "compressed marketdata"
    );
    out
}

/// Returns true if no two adjacent intervals of `series` would be merged by
/// [`compress_marketdata`] with the same `slot`.
#[must_use]
pub fn is_compressed(series: &[Marketprice], slot: TimeDelta) -> bool {
    series.windows(2).all(|w| {
        let run = Run::open(w[0].clone());
        !run.accepts(&w[1], slot)
    })
}
