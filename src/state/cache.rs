//! Per-session memo of finished requests.
//!
//! Two namespaces, one `DashMap` each, so a point rate for "USD" and the
//! 30-day "USD" series never collide. Entries live until [`RequestCache::clear`];
//! there is no expiry.

use std::hash::Hash;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::types::{PointKey, PointRate, RequestKey, SeriesKey, SeriesOutcome};

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    /// When the value was computed. Informational only.
    pub produced_at: DateTime<Utc>,
}

/// A key type that owns one cache namespace.
pub trait CacheKey: Clone + Eq + Hash + Into<RequestKey> + Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    fn slot(cache: &RequestCache) -> &DashMap<Self, CacheEntry<Self::Value>>;
}

impl CacheKey for PointKey {
    type Value = PointRate;

    fn slot(cache: &RequestCache) -> &DashMap<Self, CacheEntry<Self::Value>> {
        &cache.points
    }
}

impl CacheKey for SeriesKey {
    type Value = SeriesOutcome;

    fn slot(cache: &RequestCache) -> &DashMap<Self, CacheEntry<Self::Value>> {
        &cache.series
    }
}

#[derive(Debug, Default)]
pub struct RequestCache {
    points: DashMap<PointKey, CacheEntry<PointRate>>,
    series: DashMap<SeriesKey, CacheEntry<SeriesOutcome>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<K: CacheKey>(&self, key: &K) -> Option<K::Value> {
        K::slot(self).get(key).map(|e| e.value().value.clone())
    }

    pub fn entry<K: CacheKey>(&self, key: &K) -> Option<CacheEntry<K::Value>> {
        K::slot(self).get(key).map(|e| e.value().clone())
    }

    /// Unconditional overwrite.
    pub fn put<K: CacheKey>(&self, key: K, value: K::Value) {
        K::slot(self).insert(key, CacheEntry { value, produced_at: Utc::now() });
    }

    /// Empty both namespaces. In-flight work is untouched and will still
    /// write its result when it finishes.
    pub fn clear(&self) {
        self.points.clear();
        self.series.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len() + self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
