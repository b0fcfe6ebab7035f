use futures::future::join_all;

use crate::SpotPrice;
use spotprice_core::SpotError;

/// Fetch every instance concurrently.
///
/// Instances are independent: one failing or timing out does not affect the others. Results
/// are returned in input order.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "spotprice::refresh_all",
        skip(instances),
        fields(count = instances.len())
    )
)]
pub async fn refresh_all(instances: &mut [SpotPrice]) -> Vec<Result<usize, SpotError>> {
    let results = join_all(instances.iter_mut().map(|s| s.fetch())).await;
    #[cfg(feature = "tracing")]
    tracing::debug!(
        failed = results.iter().filter(|r| r.is_err()).count(),
        "refresh finished"
    );
    results
}
