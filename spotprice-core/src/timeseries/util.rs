//! Shared helpers for interval series invariants.

use crate::{Marketprice, SpotError};

/// Ensure `series` is ascending by start time with no overlapping intervals.
///
/// Gaps are allowed; providers skip hours they have no price for.
///
/// # Errors
/// Returns `SpotError::DataFormat` attributed to `provider` naming the first offending
/// interval.
pub fn ensure_chronological(series: &[Marketprice], provider: &str) -> Result<(), SpotError> {
    for pair in series.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start_time() < prev.end_time() {
            return Err(SpotError::data_format(
                provider,
                format!(
                    "interval starting {} overlaps or precedes interval ending {}",
                    next.start_time().to_rfc3339(),
                    prev.end_time().to_rfc3339()
                ),
            ));
        }
    }
    Ok(())
}
