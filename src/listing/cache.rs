//! Shared list cache.
//!
//! Readers of the same key share one in-flight request and one result.
//! Entries are only removed by expiry or by invalidation after a mutation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::OnceCell;

use crate::listing::query::QueryDescriptor;
use crate::repository::errors::ApiResult;

/// Identifies one cached list request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub scope: String,
    pub endpoint: String,
    pub descriptor: QueryDescriptor,
}

impl CacheKey {
    pub fn new(
        scope: impl Into<String>,
        endpoint: impl Into<String>,
        descriptor: QueryDescriptor,
    ) -> Self {
        Self {
            scope: scope.into(),
            endpoint: endpoint.into(),
            descriptor,
        }
    }
}

#[derive(Debug)]
struct Entry<T> {
    created: Instant,
    cell: Arc<OnceCell<T>>,
}

#[derive(Debug)]
pub struct QueryCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry<T>>>,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key` or runs `fetch` to produce it.
    /// Concurrent callers wait on the same fetch; errors are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let cell = self.cell_for(key);
        let value = cell.get_or_try_init(fetch).await?;
        Ok(value.clone())
    }

    fn cell_for(&self, key: CacheKey) -> Arc<OnceCell<T>> {
        let now = Instant::now();
        let mut entries = self.lock();
        if let Some(entry) = entries.get(&key) {
            let fresh = now.saturating_duration_since(entry.created) < self.ttl;
            if fresh || !entry.cell.initialized() {
                return entry.cell.clone();
            }
        }
        let cell = Arc::new(OnceCell::new());
        entries.insert(
            key,
            Entry {
                created: now,
                cell: cell.clone(),
            },
        );
        cell
    }

    /// Drops every entry for `endpoint` across all scopes; returns how many.
    pub fn invalidate(&self, endpoint: &str) -> usize {
        self.remove_where(|key| key.endpoint == endpoint)
    }

    /// Drops every entry of one signed-in user.
    pub fn invalidate_scope(&self, scope: &str) -> usize {
        self.remove_where(|key| key.scope == scope)
    }

    /// Removes expired, settled entries.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| {
            now.saturating_duration_since(entry.created) < ttl || !entry.cell.initialized()
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn remove_where(&self, predicate: impl Fn(&CacheKey) -> bool) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        before - entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::repository::errors::ApiError;

    fn key(scope: &str, endpoint: &str, page: usize) -> CacheKey {
        CacheKey::new(
            scope,
            endpoint,
            QueryDescriptor {
                page,
                ..QueryDescriptor::default()
            },
        )
    }

    #[actix_web::test]
    async fn concurrent_readers_share_one_fetch() {
        let cache = QueryCache::<usize>::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let load = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(7)
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch(key("u1", "events", 1), load),
            cache.get_or_fetch(key("u1", "events", 1), load),
        );
        assert_eq!((a, b), (Ok(7), Ok(7)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn errors_are_not_cached() {
        let cache = QueryCache::<usize>::new(Duration::from_secs(60));
        let failed = cache
            .get_or_fetch(key("u1", "events", 1), || async {
                Err(ApiError::Network("down".into()))
            })
            .await;
        assert!(failed.is_err());
        let value = cache
            .get_or_fetch(key("u1", "events", 1), || async { Ok(3) })
            .await;
        assert_eq!(value, Ok(3));
    }

    #[actix_web::test]
    async fn invalidation_is_per_endpoint() {
        let cache = QueryCache::<usize>::new(Duration::from_secs(60));
        for (scope, endpoint) in [("u1", "events"), ("u2", "events"), ("u1", "users")] {
            cache
                .get_or_fetch(key(scope, endpoint, 1), || async { Ok(1) })
                .await
                .unwrap();
        }
        assert_eq!(cache.invalidate("events"), 2);
        assert_eq!(cache.len(), 1);

        let refetched = cache
            .get_or_fetch(key("u1", "events", 1), || async { Ok(2) })
            .await;
        assert_eq!(refetched, Ok(2));
        assert_eq!(cache.invalidate_scope("u1"), 2);
        assert!(cache.is_empty());
    }

    #[actix_web::test]
    async fn expired_entries_are_refetched() {
        let cache = QueryCache::<usize>::new(Duration::ZERO);
        cache
            .get_or_fetch(key("u1", "events", 1), || async { Ok(1) })
            .await
            .unwrap();
        let value = cache
            .get_or_fetch(key("u1", "events", 1), || async { Ok(2) })
            .await;
        assert_eq!(value, Ok(2));
        assert_eq!(cache.purge_expired(), 1);
    }
}
