//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use blogline::application::posts::PostService;
use blogline::cache::{
    CacheAdapter, CacheConfig, CacheError, CacheStore, InMemoryCacheStore, InvalidationMode,
    InvalidationObserver, InvalidationTarget,
};
use blogline::infra::memory::InMemoryPostsRepo;

/// In-memory store that records every operation it receives.
#[derive(Default)]
pub struct SpyCacheStore {
    inner: InMemoryCacheStore,
    ops: Mutex<Vec<String>>,
}

impl SpyCacheStore {
    pub fn inner(&self) -> &InMemoryCacheStore {
        &self.inner
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Operations that remove entries.
    pub fn deletions(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter(|op| op.starts_with("del ") || op.starts_with("scan "))
            .collect()
    }

    fn record(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl CacheStore for SpyCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.record(format!("get {key}"));
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.record(format!("set {key}"));
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.record(format!("del {key}"));
        self.inner.delete(key).await
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        self.record(format!("scan {pattern}"));
        self.inner.delete_by_pattern(pattern).await
    }
}

/// Every call fails as if the backend were unreachable.
#[derive(Default)]
pub struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Timeout)
    }

    async fn delete_by_pattern(&self, _pattern: &str) -> Result<u64, CacheError> {
        Err(CacheError::Timeout)
    }
}

/// Reads miss, writes fail.
#[derive(Default)]
pub struct WriteFailingCacheStore;

#[async_trait]
impl CacheStore for WriteFailingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("OOM command not allowed".into()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete_by_pattern(&self, _pattern: &str) -> Result<u64, CacheError> {
        Ok(0)
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    failures: Mutex<Vec<InvalidationTarget>>,
}

impl RecordingObserver {
    pub fn failures(&self) -> Vec<InvalidationTarget> {
        self.failures.lock().unwrap().clone()
    }
}

impl InvalidationObserver for RecordingObserver {
    fn invalidation_failed(&self, target: &InvalidationTarget, _error: &CacheError) {
        self.failures.lock().unwrap().push(target.clone());
    }
}

pub struct Harness {
    pub repo: Arc<InMemoryPostsRepo>,
    pub store: Arc<SpyCacheStore>,
    pub observer: Arc<RecordingObserver>,
    pub service: PostService,
}

impl Harness {
    pub fn new(mode: InvalidationMode) -> Self {
        let repo = Arc::new(InMemoryPostsRepo::new());
        let store = Arc::new(SpyCacheStore::default());
        let observer = Arc::new(RecordingObserver::default());
        let service = service_over(repo.clone(), store.clone(), mode).with_observer(observer.clone());
        Self {
            repo,
            store,
            observer,
            service,
        }
    }
}

pub fn service_over(
    repo: Arc<InMemoryPostsRepo>,
    store: Arc<dyn CacheStore>,
    mode: InvalidationMode,
) -> PostService {
    let config = CacheConfig {
        invalidation: mode,
        ..CacheConfig::default()
    };
    PostService::new(repo, CacheAdapter::new(store), config)
}
