//! Bounded-staleness memoization for expensive file system scans.
//!
//! Component/route listings and glob-based import searches are recomputed at
//! most once per time window instead of being invalidated precisely on every
//! file change. [`TtlCache`] makes that policy explicit: every entry carries
//! its own expiry and is treated as a miss once that instant has passed.
//!
//! All `*_at` methods take the current [`Instant`] explicitly so eviction can be
//! tested without sleeping.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug)]
struct CacheEntry<V> {
    expires_at: Instant,
    value: V,
}

#[derive(Debug)]
struct CacheInner<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    /// Insertion order; front = oldest.
    order: VecDeque<K>,
}

impl<K: Eq + Hash, V> CacheInner<K, V> {
    fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.expires_at > now);
        let map = &self.map;
        self.order.retain(|key| map.contains_key(key));
        before - self.map.len()
    }
}

impl<K, V> Default for CacheInner<K, V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }
}

/// A key → (value, expiry) map with a fixed time-to-live.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    max_entries: usize,
    inner: Mutex<CacheInner<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_max_entries(ttl, usize::MAX)
    }

    /// Like [`TtlCache::new`] but also evicts the oldest entries once more than
    /// `max_entries` keys are stored.
    pub fn with_max_entries(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut inner = self.inner.lock();
        let fresh = inner.map.get(key).map(|entry| entry.expires_at > now)?;
        if fresh {
            return inner.map.get(key).map(|entry| entry.value.clone());
        }

        inner.map.remove(key);
        if let Some(pos) = inner.order.iter().position(|k| k == key) {
            inner.order.remove(pos);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Stores `value` for `key`. Entries already expired at `now` are purged
    /// first, then the oldest keys beyond `max_entries`.
    pub fn insert_at(&self, key: K, value: V, now: Instant) {
        let mut inner = self.inner.lock();
        inner.purge_expired(now);
        let entry = CacheEntry {
            expires_at: now + self.ttl,
            value,
        };
        if inner.map.insert(key.clone(), entry).is_some() {
            if let Some(pos) = inner.order.iter().position(|k| *k == key) {
                inner.order.remove(pos);
            }
        }
        inner.order.push_back(key);

        while inner.map.len() > self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.map.remove(&oldest);
        }
    }

    /// Return the cached value for `key`, computing and storing it when missing
    /// or expired.
    ///
    /// The lock is not held while `compute` runs.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        self.get_or_insert_with_at(key, Instant::now(), compute)
    }

    pub fn get_or_insert_with_at(&self, key: K, now: Instant, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get_at(&key, now) {
            return value;
        }
        let value = compute();
        self.insert_at(key, value.clone(), now);
        value
    }

    pub fn invalidate(&self, key: &K) {
        let mut inner = self.inner.lock();
        if inner.map.remove(key).is_some() {
            if let Some(pos) = inner.order.iter().position(|k| k == key) {
                inner.order.remove(pos);
            }
        }
    }

    /// Drop every entry whose expiry is at or before `now`; returns how many were removed.
    pub fn evict_expired_at(&self, now: Instant) -> usize {
        let evicted = self.inner.lock().purge_expired(now);
        if evicted > 0 {
            tracing::trace!(target: "els.cache", evicted, "evicted expired entries");
        }
        evicted
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.map.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
