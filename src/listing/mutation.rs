//! Write-then-refetch: successful mutations mark dependent lists stale.

use std::future::Future;

use crate::listing::cache::QueryCache;
use crate::repository::errors::ApiResult;

/// Awaits `mutation` and, on success, drops every cached list of `endpoint`
/// so the next render fetches server state. Nothing is merged locally.
pub async fn mutate_then_invalidate<C, T, Fut>(
    cache: &QueryCache<C>,
    endpoint: &str,
    mutation: Fut,
) -> ApiResult<T>
where
    C: Clone,
    Fut: Future<Output = ApiResult<T>>,
{
    let result = mutation.await;
    match &result {
        Ok(_) => {
            let dropped = cache.invalidate(endpoint);
            log::info!("Invalidated {dropped} cached list(s) of {endpoint}");
        }
        Err(err) => log::warn!("Mutation on {endpoint} failed: {err}"),
    }
    result
}
