//! Keyed response cache with stale times and prefix invalidation

use super::keys::QueryKey;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::time::Instant;

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    stale_time: Duration,
    invalidated: bool,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < self.stale_time
    }
}

#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Entry>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache").finish_non_exhaustive()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve `key` from the cache while fresh, otherwise run `fetch` and
    /// store its result. Failures are not cached.
    pub async fn fetch<T, E, F, Fut>(
        &self,
        key: QueryKey,
        stale_time: Duration,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh(&key) {
            trace!(%key, "Cache hit");
            return Ok(value);
        }

        debug!(%key, "Fetching");
        let value = fetch().await?;
        self.set(key, value.clone(), stale_time);
        Ok(value)
    }

    fn fresh<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.read()
            .get(key)
            .filter(|entry| entry.is_fresh())
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    /// Last stored value, fresh or not
    pub fn peek<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.read()
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, value: T, stale_time: Duration) {
        let entry = Entry {
            value: Arc::new(value),
            fetched_at: Instant::now(),
            stale_time,
            invalidated: false,
        };
        self.write().insert(key, entry);
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.read().get(key).is_some_and(Entry::is_fresh)
    }

    /// Mark every entry under `prefix` stale; returns how many matched
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.write();
        let mut matched = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                matched += 1;
            }
        }
        debug!(%prefix, matched, "Invalidated queries");
        matched
    }

    pub fn clear(&self) {
        self.write().clear();
        debug!("Query cache cleared");
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::keys::{appointments, auth, doctors};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(
        cache: &QueryCache,
        key: QueryKey,
        stale_time: Duration,
        calls: &AtomicUsize,
    ) -> u32 {
        cache
            .fetch(key, stale_time, || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<_, ()>(u32::try_from(n).unwrap())
            })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entries_are_served_from_cache() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let stale = Duration::from_secs(300);

        assert_eq!(counted(&cache, auth::current_user(), stale, &calls).await, 1);
        assert_eq!(counted(&cache, auth::current_user(), stale, &calls).await, 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(counted(&cache, auth::current_user(), stale, &calls).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_stale_time_always_refetches() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);

        counted(&cache, doctors::my_stats(), Duration::ZERO, &calls).await;
        counted(&cache, doctors::my_stats(), Duration::ZERO, &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.peek::<u32>(&doctors::my_stats()), Some(2));
    }

    #[test]
    fn test_prefix_invalidation() {
        let cache = QueryCache::new();
        let hour = Duration::from_secs(3600);
        let filtered = appointments::my_appointments(None).push("{}");
        cache.set(filtered.clone(), 1_u8, hour);
        cache.set(appointments::stats(), 2_u8, hour);
        cache.set(auth::current_user(), 3_u8, hour);

        let matched = cache.invalidate(&appointments::my_appointments(None));
        assert_eq!(matched, 1);
        assert!(!cache.is_fresh(&filtered));
        assert!(cache.is_fresh(&appointments::stats()));

        assert_eq!(cache.invalidate(&appointments::all()), 2);
        assert!(cache.is_fresh(&auth::current_user()));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = QueryCache::new();
        let result: Result<u8, &str> = cache
            .fetch(doctors::my_profile(), Duration::from_secs(60), || async {
                Err("offline")
            })
            .await;
        assert_eq!(result, Err("offline"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::new();
        cache.set(auth::current_user(), 1_u8, Duration::ZERO);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.peek::<u8>(&auth::current_user()).is_none());
    }
}
