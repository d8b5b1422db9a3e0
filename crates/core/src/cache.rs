//! Query cache for live search results.
//!
//! Entries are keyed by a value-typed [`QueryKey`] (resource type plus the
//! serialised search parameters) and stamped with the time they were fetched.
//! An entry older than the configured TTL is treated as absent, and expired
//! entries are dropped on the next insert. Writes call
//! [`QueryCache::invalidate`] for the resource type they touched; nothing is
//! invalidated implicitly.
//!
//! The cache holds converted views before client-side filtering, so every
//! query that maps onto the same FHIR parameters shares one entry.

use chrono::{DateTime, Utc};
use fhir::{ResourceType, SearchParams};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: ResourceType,
    pub params: String,
}

impl QueryKey {
    pub fn new(resource: ResourceType, params: &SearchParams) -> Self {
        Self {
            resource,
            params: params.to_query_string(),
        }
    }
}

#[derive(Clone, Debug)]
struct CachedEntry<V> {
    views: Vec<V>,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct QueryCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<QueryKey, CachedEntry<V>>>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &QueryKey) -> Option<Vec<V>> {
        self.get_at(key, Utc::now()).await
    }

    /// Look up `key` as of `now`; expired entries are misses.
    pub async fn get_at(&self, key: &QueryKey, now: DateTime<Utc>) -> Option<Vec<V>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        self.is_fresh(entry, now).then(|| entry.views.clone())
    }

    pub async fn insert(&self, key: QueryKey, views: Vec<V>) {
        self.insert_at(key, views, Utc::now()).await;
    }

    /// Store `views` under `key`, dropping every entry already expired as of
    /// `fetched_at`.
    pub async fn insert_at(&self, key: QueryKey, views: Vec<V>, fetched_at: DateTime<Utc>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| self.is_fresh(entry, fetched_at));
        entries.insert(key, CachedEntry { views, fetched_at });
    }

    fn is_fresh(&self, entry: &CachedEntry<V>, now: DateTime<Utc>) -> bool {
        (now - entry.fetched_at).to_std().unwrap_or_default() < self.ttl
    }

    /// Drop every entry for `resource`.
    pub async fn invalidate(&self, resource: ResourceType) {
        self.entries
            .write()
            .await
            .retain(|key, _| key.resource != resource);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(resource: ResourceType, name: &str) -> QueryKey {
        let mut params = SearchParams::new();
        params.push("name", name);
        QueryKey::new(resource, &params)
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let fetched = Utc::now();
        cache
            .insert_at(key(ResourceType::Patient, "jane"), vec![1, 2], fetched)
            .await;

        let k = key(ResourceType::Patient, "jane");
        assert_eq!(
            cache.get_at(&k, fetched + chrono::Duration::seconds(59)).await,
            Some(vec![1, 2])
        );
        assert_eq!(
            cache.get_at(&k, fetched + chrono::Duration::seconds(60)).await,
            None
        );
    }

    #[tokio::test]
    async fn insert_drops_expired_entries() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let start = Utc::now();
        for name in ["a", "b", "c"] {
            cache
                .insert_at(key(ResourceType::Patient, name), vec![1], start)
                .await;
        }
        cache
            .insert_at(
                key(ResourceType::Task, "a"),
                vec![2],
                start + chrono::Duration::seconds(30),
            )
            .await;
        assert_eq!(cache.len().await, 4);

        let later = start + chrono::Duration::seconds(61);
        cache
            .insert_at(key(ResourceType::Patient, "d"), vec![3], later)
            .await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(
            cache.get_at(&key(ResourceType::Task, "a"), later).await,
            Some(vec![2])
        );
        assert_eq!(cache.get_at(&key(ResourceType::Patient, "a"), later).await, None);
    }

    #[tokio::test]
    async fn keys_are_compared_by_value() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(key(ResourceType::Patient, "jane"), vec![1]).await;

        assert_eq!(cache.get(&key(ResourceType::Patient, "jane")).await, Some(vec![1]));
        assert_eq!(cache.get(&key(ResourceType::Patient, "john")).await, None);
        assert_eq!(cache.get(&key(ResourceType::Practitioner, "jane")).await, None);
    }

    #[tokio::test]
    async fn invalidate_drops_only_that_resource() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(key(ResourceType::Patient, "a"), vec![1]).await;
        cache.insert(key(ResourceType::Patient, "b"), vec![2]).await;
        cache.insert(key(ResourceType::Task, "a"), vec![3]).await;

        cache.invalidate(ResourceType::Patient).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&key(ResourceType::Task, "a")).await, Some(vec![3]));

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn zero_ttl_disables_caching() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.insert(key(ResourceType::Patient, "a"), vec![1]).await;
        assert_eq!(cache.len().await, 0);
    }
}
