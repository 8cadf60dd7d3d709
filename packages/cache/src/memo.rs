use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::CacheKey;

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// In-memory memoization keyed by [`CacheKey`].
pub struct MemoCache<T> {
    ttl: Option<Duration>,
    entries: HashMap<CacheKey, Entry<T>>,
}

impl<T: Clone> MemoCache<T> {
    /// Creates an empty cache. `ttl = None` keeps entries until they are
    /// invalidated.
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    fn is_fresh(&self, entry: &Entry<T>) -> bool {
        self.ttl.is_none_or(|ttl| entry.stored_at.elapsed() < ttl)
    }

    /// Returns the stored value for `key` if it has not expired.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<T> {
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: CacheKey, value: T) {
        self.entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Returns the cached value for `key`, or runs `load` and caches its
    /// result.
    ///
    /// `load` runs at most once per call and only when there is no fresh
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns whatever `load` fails with. Failures are not cached, so the
    /// next call retries.
    pub async fn get_or_try_load<F, Fut, E>(&mut self, key: CacheKey, load: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(&key) {
            log::debug!("Memo hit {key}");
            return Ok(value);
        }

        log::debug!("Memo miss {key}");
        self.purge_expired();
        let value = load().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drops the entry for `key`. Returns whether one existed.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops every expired entry. Returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before - self.entries.len()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for MemoCache<T> {
    fn default() -> Self {
        Self::new(None)
    }
}
