//! Process-local cache store.

use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher};
use lru::LruCache;
use tokio::time::Instant;

use super::config::DEFAULT_MEMORY_CAPACITY;
use super::lock::{rw_read, rw_write};
use super::store::{CacheError, CacheStore};

const OWNER: &str = "cache::memory";

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// LRU-bounded [`CacheStore`] with the same expiry and glob semantics as Redis.
///
/// Expired entries are dropped lazily on access and on pattern deletes; the
/// least recently used entry is evicted once `capacity` is reached.
pub struct InMemoryCacheStore {
    entries: RwLock<LruCache<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        rw_read(&self.entries, OWNER, "capacity").cap().get()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        rw_read(&self.entries, OWNER, "len")
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        rw_read(&self.entries, OWNER, "contains_key")
            .peek(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// Sorted live keys.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = rw_read(&self.entries, OWNER, "keys")
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCacheStore")
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, OWNER, "get");
        let lookup = entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));
        match lookup {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        rw_write(&self.entries, OWNER, "set").put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        rw_write(&self.entries, OWNER, "delete").pop(key);
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let matcher = compile_pattern(pattern)?;
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, OWNER, "delete_by_pattern");

        let mut removed = 0;
        let mut doomed = Vec::new();
        for (key, entry) in entries.iter() {
            if !entry.is_live(now) {
                doomed.push(key.clone());
            } else if matcher.is_match(key.as_str()) {
                doomed.push(key.clone());
                removed += 1;
            }
        }
        for key in &doomed {
            entries.pop(key);
        }
        Ok(removed)
    }
}

/// Compile a Redis `MATCH` pattern: `*` spans any run of characters, `?`
/// matches one, `[..]` is a class and `\` escapes.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher, CacheError> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|err| CacheError::Backend(format!("invalid key pattern `{pattern}`: {err}")))
}

/// Whether `candidate` matches `pattern`. Invalid patterns match nothing.
pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    compile_pattern(pattern).is_ok_and(|matcher| matcher.is_match(candidate))
}
