//! In-memory TTL caching shared by the airspace, route and flight-summary pipelines.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::clock::{saturating_add, Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: OffsetDateTime,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        now <= self.expires_at
    }
}

#[derive(Debug)]
struct CacheInner<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    default_ttl: Duration,
}

/// Thread-safe cache whose entries expire independently.
///
/// Expired entries are never returned; they are dropped lazily on the next `get`
/// or in bulk by [`TtlCache::clear_expired`]. There is no capacity bound.
pub struct TtlCache<K, V> {
    inner: Arc<RwLock<CacheInner<K, V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache with a default TTL backed by the system clock.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                map: HashMap::new(),
                default_ttl,
            })),
            clock,
        }
    }

    /// Create a disabled cache; every `set` is a no-op.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns the value if present and not expired. An expired entry is removed.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        {
            let store = self.inner.read().await;
            match store.map.get(key) {
                None => return None,
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut store = self.inner.write().await;
        if store.map.get(key).is_some_and(|entry| !entry.is_live(now)) {
            store.map.remove(key);
        }
        None
    }

    /// Stores a value for `ttl_override`, or the default TTL when `None`.
    ///
    /// A cache created with a zero default TTL is disabled and ignores writes.
    pub async fn set(&self, key: K, value: V, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;
        if store.default_ttl.is_zero() {
            return;
        }

        let ttl = ttl_override.unwrap_or(store.default_ttl);
        let ttl = time::Duration::try_from(ttl).unwrap_or(time::Duration::MAX);
        let expires_at = saturating_add(self.clock.now(), ttl);
        store.map.insert(key, CacheEntry { value, expires_at });
    }

    /// Stores a value with an absolute expiry. Already-expired values are ignored.
    pub async fn set_until(&self, key: K, value: V, expires_at: OffsetDateTime) {
        if expires_at < self.clock.now() {
            return;
        }
        let mut store = self.inner.write().await;
        store.map.insert(key, CacheEntry { value, expires_at });
    }

    /// Live entries with their absolute expiry.
    pub async fn snapshot(&self) -> Vec<(K, V, OffsetDateTime)> {
        let now = self.clock.now();
        let store = self.inner.read().await;
        store
            .map
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone(), entry.expires_at))
            .collect()
    }

    /// Remove expired entries; returns how many were dropped.
    pub async fn clear_expired(&self) -> usize {
        let now = self.clock.now();
        let mut store = self.inner.write().await;
        let before = store.map.len();
        store.map.retain(|_, entry| entry.is_live(now));
        before - store.map.len()
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn default_ttl(&self) -> Duration {
        self.inner.read().await.default_ttl
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
