//! Cache store contract and the typed JSON layer above it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::keys::InvalidationTarget;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache operation timed out")]
    Timeout,
    #[error("cache entry could not be decoded: {0}")]
    Decode(String),
    #[error("cache value could not be encoded: {0}")]
    Encode(String),
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Raw string key-value store with per-entry expiry.
///
/// Patterns use glob syntax where `*` matches any run of characters and `?`
/// exactly one.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Absent for missing or expired keys.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Replace any existing entry; it expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key matching `pattern`, returning how many were removed.
    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, CacheError>;
}

/// Shared handle used by the service layer.
#[derive(Clone)]
pub struct CacheAdapter {
    store: Arc<dyn CacheStore>,
}

impl CacheAdapter {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|err| CacheError::Decode(err.to_string())),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value).map_err(|err| CacheError::Encode(err.to_string()))?;
        self.store.set(key, raw, ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key).await
    }

    pub async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        self.store.delete_by_pattern(pattern).await
    }

    /// Delete one planned target. Exact keys report one removal whether or not
    /// they existed.
    pub async fn invalidate(&self, target: &InvalidationTarget) -> Result<u64, CacheError> {
        match target {
            InvalidationTarget::Key(key) => self.delete(key).await.map(|()| 1),
            InvalidationTarget::Pattern(pattern) => self.delete_by_pattern(pattern).await,
        }
    }
}

impl std::fmt::Debug for CacheAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAdapter").finish_non_exhaustive()
    }
}
