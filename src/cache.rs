//! TTL-keyed memoization of generated content.
//!
//! [`ContentCache`] stores every completed generation (primary, fallback,
//! or the error notice) under its request fingerprint. Entries are valid
//! for the configured TTL (24h by default) and a newer entry for the same
//! fingerprint overwrites the old one.
//!
//! The cache is a bounded moka LRU: the TTL is enforced on read and stale
//! entries are purged by moka's maintenance tasks, so a stream of distinct
//! passages cannot grow memory without limit.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;

use crate::telemetry;

/// Configuration for the content cache.
///
/// ```rust
/// # use lectio::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(5_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 24 hours.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// A memoized generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub content: String,
    /// Label of whatever produced the content (key label, "fallback", "error").
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Summary of one entry for administrative listings.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntrySummary {
    /// First 16 characters of the fingerprint.
    pub key: String,
    pub source: String,
    pub content_length: usize,
    pub age_hours: f64,
}

/// In-memory content cache keyed by request fingerprint.
pub struct ContentCache {
    cache: Cache<String, CacheEntry>,
}

impl ContentCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self { cache }
    }

    /// Look up a still-valid entry.
    ///
    /// Emits cache hit/miss metrics.
    pub async fn get(&self, fingerprint: &str) -> Option<CacheEntry> {
        match self.cache.get(fingerprint).await {
            Some(entry) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(entry)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert or overwrite the entry for `fingerprint`.
    pub async fn put(&self, fingerprint: &str, content: &str, source: &str) {
        let entry = CacheEntry {
            content: content.to_owned(),
            source: source.to_owned(),
            created_at: Utc::now(),
        };
        self.cache.insert(fingerprint.to_owned(), entry).await;
    }

    /// Number of live entries.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove every entry, returning how many were removed.
    pub async fn clear(&self) -> u64 {
        let removed = self.len().await;
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        removed
    }

    /// Up to `limit` entry summaries, in no particular order.
    pub fn entries(&self, limit: usize) -> Vec<CacheEntrySummary> {
        let now = Utc::now();
        self.cache
            .iter()
            .take(limit)
            .map(|(key, entry)| CacheEntrySummary {
                key: key.chars().take(16).collect(),
                source: entry.source.clone(),
                content_length: entry.content.len(),
                age_hours: ((now - entry.created_at).num_seconds() as f64 / 3600.0 * 100.0)
                    .round()
                    / 100.0,
            })
            .collect()
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_one_day() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(86_400));
        assert_eq!(config.max_entries, 10_000);
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = ContentCache::default();
        assert!(cache.get("fp").await.is_none());

        cache.put("fp", "content", "Key 1").await;
        let entry = cache.get("fp").await.unwrap();
        assert_eq!(entry.content, "content");
        assert_eq!(entry.source, "Key 1");
    }

    #[tokio::test]
    async fn put_overwrites() {
        let cache = ContentCache::default();
        cache.put("fp", "old", "fallback").await;
        cache.put("fp", "new", "Key 2").await;
        let entry = cache.get("fp").await.unwrap();
        assert_eq!(entry.content, "new");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn clear_reports_removed_count() {
        let cache = ContentCache::default();
        cache.put("a", "1", "s").await;
        cache.put("b", "2", "s").await;
        assert_eq!(cache.clear().await, 2);
        assert!(cache.get("a").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn entries_truncate_keys() {
        let cache = ContentCache::default();
        let fp = crate::passage::fingerprint("Jean 3:16", 500, true);
        cache.put(&fp, "abc", "fallback").await;
        let entries = cache.entries(10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, &fp[..16]);
        assert_eq!(entries[0].content_length, 3);
    }
}
