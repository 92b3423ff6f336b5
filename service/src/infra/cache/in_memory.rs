//! [`InMemory`] [`Cache`] implementation.

use std::{convert::Infallible, fmt, hash::Hash, sync::Arc};

use common::operations::{By, Delete, Insert, Select};
use dashmap::DashMap;
use tokio::time;

use super::{Cache, Expired};

/// [`Cache`] keeping values in memory for a fixed time to live.
///
/// Clones share the same storage. Freshness is measured with the [`tokio`]
/// clock, so it follows paused and advanced time in tests.
pub struct InMemory<K, V> {
    /// Duration a stored value is considered fresh for.
    ttl: time::Duration,

    /// Stored values along with the moments they were stored at.
    entries: Arc<DashMap<K, (time::Instant, V)>>,
}

impl<K: Eq + Hash, V> InMemory<K, V> {
    /// Creates a new empty [`InMemory`] [`Cache`] with the provided time to
    /// live.
    #[must_use]
    pub fn new(ttl: time::Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Returns the time to live of values in this [`InMemory`] [`Cache`].
    #[must_use]
    pub const fn ttl(&self) -> time::Duration {
        self.ttl
    }

    /// Returns the number of stored values, including expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Indicates whether this [`InMemory`] [`Cache`] stores nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Clone for InMemory<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K: Eq + Hash, V> fmt::Debug for InMemory<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemory")
            .field("ttl", &self.ttl)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> Cache<Select<By<Option<V>, K>>> for InMemory<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    type Ok = Option<V>;
    type Err = Infallible;

    async fn execute(
        &self,
        Select(by): Select<By<Option<V>, K>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        Ok(self
            .entries
            .get(&key)
            .filter(|entry| entry.0.elapsed() < self.ttl)
            .map(|entry| entry.1.clone()))
    }
}

impl<K, V> Cache<Insert<(K, V)>> for InMemory<K, V>
where
    K: Eq + Hash,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Insert((key, value)): Insert<(K, V)>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.entries.insert(key, (time::Instant::now(), value));
        Ok(())
    }
}

impl<K, V> Cache<Delete<Expired>> for InMemory<K, V>
where
    K: Eq + Hash,
{
    /// Number of evicted values.
    type Ok = usize;
    type Err = Infallible;

    async fn execute(
        &self,
        Delete(Expired): Delete<Expired>,
    ) -> Result<Self::Ok, Self::Err> {
        let before = self.entries.len();
        self.entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        Ok(before.saturating_sub(self.entries.len()))
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::{By, Delete, Insert, Select};
    use tokio::time;

    use super::{Cache as _, Expired, InMemory};

    #[tokio::test]
    async fn returns_fresh_values() {
        let cache = InMemory::<&str, u32>::new(Duration::from_secs(300));

        cache.execute(Insert(("a", 1))).await.unwrap();

        let hit = cache
            .execute(Select(By::<Option<u32>, _>::new("a")))
            .await
            .unwrap();
        let miss = cache
            .execute(Select(By::<Option<u32>, _>::new("b")))
            .await
            .unwrap();
        assert_eq!(hit, Some(1));
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn overwrites_values() {
        let cache = InMemory::<&str, u32>::new(Duration::from_secs(300));

        cache.execute(Insert(("a", 1))).await.unwrap();
        cache.execute(Insert(("a", 2))).await.unwrap();

        let hit = cache
            .execute(Select(By::<Option<u32>, _>::new("a")))
            .await
            .unwrap();
        assert_eq!(hit, Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn hides_expired_values() {
        let cache = InMemory::<&str, u32>::new(Duration::ZERO);

        cache.execute(Insert(("a", 1))).await.unwrap();

        let hit = cache
            .execute(Select(By::<Option<u32>, _>::new("a")))
            .await
            .unwrap();
        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn evicts_only_expired_values() {
        let fresh = InMemory::<&str, u32>::new(Duration::from_secs(300));
        fresh.execute(Insert(("a", 1))).await.unwrap();
        assert_eq!(fresh.execute(Delete(Expired)).await.unwrap(), 0);
        assert_eq!(fresh.len(), 1);

        let stale = InMemory::<&str, u32>::new(Duration::ZERO);
        stale.execute(Insert(("a", 1))).await.unwrap();
        stale.execute(Insert(("b", 2))).await.unwrap();
        assert_eq!(stale.execute(Delete(Expired)).await.unwrap(), 2);
        assert!(stale.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expires_values_after_ttl() {
        let cache = InMemory::<&str, u32>::new(Duration::from_secs(300));
        cache.execute(Insert(("a", 1))).await.unwrap();

        time::advance(Duration::from_secs(299)).await;
        let hit = cache
            .execute(Select(By::<Option<u32>, _>::new("a")))
            .await
            .unwrap();
        assert_eq!(hit, Some(1));
        assert_eq!(cache.execute(Delete(Expired)).await.unwrap(), 0);

        time::advance(Duration::from_secs(1)).await;
        let miss = cache
            .execute(Select(By::<Option<u32>, _>::new("a")))
            .await
            .unwrap();
        assert_eq!(miss, None);
        assert_eq!(cache.execute(Delete(Expired)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let cache = InMemory::<&str, u32>::new(Duration::from_secs(300));
        let clone = cache.clone();

        clone.execute(Insert(("a", 1))).await.unwrap();

        let hit = cache
            .execute(Select(By::<Option<u32>, _>::new("a")))
            .await
            .unwrap();
        assert_eq!(hit, Some(1));
    }
}
