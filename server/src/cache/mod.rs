//! In-memory caching using Moka.
//!
//! String-keyed cache with per-entry TTL. Keys follow a `prefix:rest`
//! convention (`product:<id>`, `products:<org>:<query>`, `refresh_token:<user>`,
//! `blacklist:<token>`), which makes prefix invalidation possible when
//! catalog data changes.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Cached value together with the TTL chosen when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    ttl: Duration,
}

/// Reads the TTL each entry carries instead of a cache-wide constant.
struct PerEntryExpiry;

impl Expiry<String, CacheEntry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Shared cache service.
///
/// Thread-safe and cheap to clone; every clone points at the same
/// underlying cache.
#[derive(Clone)]
pub struct CacheService {
    cache: Cache<String, CacheEntry>,
}

impl CacheService {
    /// Creates a cache with the given maximum entry count.
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .support_invalidation_closures()
            .build();

        Self { cache }
    }

    /// Looks up a key, returning the stored string if present and unexpired.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await.map(|entry| entry.value)
    }

    /// Stores a value under `key` for `ttl_secs` seconds.
    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl_secs: u64) {
        let entry = CacheEntry {
            value: value.into(),
            ttl: Duration::from_secs(ttl_secs),
        };
        self.cache.insert(key.into(), entry).await;
    }

    /// Removes a single key.
    pub async fn delete(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Removes every key starting with `prefix`.
    ///
    /// Used for list caches whose keys embed the query, e.g.
    /// `products:<org>:` after any catalog write in that organization.
    pub fn delete_prefix(&self, prefix: &str) {
        let prefix = prefix.to_string();
        // Closure-based invalidation is lazy; entries disappear on next access.
        let _ = self
            .cache
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix));
    }

    /// Drops everything. Test helper and emergency lever.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka handles this in the background; tests call it to make
    /// invalidation observable immediately.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
