use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::application::repos::{PostsRepo, RepoError};
use crate::cache::metrics::{CACHE_ERROR_TOTAL, CACHE_HIT_TOTAL, CACHE_MISS_TOTAL};
use crate::cache::{
    CacheAdapter, CacheConfig, CacheKey, InvalidationObserver, InvalidationTarget,
    TracingInvalidationObserver,
};

#[derive(Clone)]
pub struct PostService {
    pub(crate) repo: Arc<dyn PostsRepo>,
    pub(crate) cache: CacheAdapter,
    pub(crate) config: CacheConfig,
    pub(crate) observer: Arc<dyn InvalidationObserver>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostsRepo>, cache: CacheAdapter, config: CacheConfig) -> Self {
        Self {
            repo,
            cache,
            config,
            observer: Arc::new(TracingInvalidationObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvalidationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Serve `key` from the cache, or run `load` and populate on a present value.
    ///
    /// Any cache failure, including an undecodable entry, is treated as a miss.
    /// A `None` from `load` is passed through and never cached.
    pub(crate) async fn read_through<T, F, Fut>(
        &self,
        key: CacheKey,
        load: F,
    ) -> Result<Option<T>, RepoError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, RepoError>>,
    {
        let key = key.to_string();

        match self.cache.get_json::<T>(&key).await {
            Ok(Some(hit)) => {
                counter!(CACHE_HIT_TOTAL).increment(1);
                debug!(target = "blogline::posts::cache", key = %key, "cache hit");
                return Ok(Some(hit));
            }
            Ok(None) => {
                counter!(CACHE_MISS_TOTAL).increment(1);
            }
            Err(err) => {
                counter!(CACHE_ERROR_TOTAL, "op" => "get").increment(1);
                warn!(
                    target = "blogline::posts::cache",
                    key = %key,
                    error = %err,
                    "Cache read failed; serving from storage"
                );
            }
        }

        let loaded = load().await?;

        if let Some(value) = loaded.as_ref() {
            if let Err(err) = self.cache.set_json(&key, value, self.config.ttl).await {
                counter!(CACHE_ERROR_TOTAL, "op" => "set").increment(1);
                warn!(
                    target = "blogline::posts::cache",
                    key = %key,
                    error = %err,
                    "Cache populate failed"
                );
            }
        }

        Ok(loaded)
    }

    /// Delete every target, reporting failures without stopping.
    pub(crate) async fn invalidate(&self, targets: &[InvalidationTarget]) {
        for target in targets {
            match self.cache.invalidate(target).await {
                Ok(removed) => debug!(
                    target = "blogline::posts::cache",
                    cache_target = %target,
                    removed,
                    "cache invalidated"
                ),
                Err(err) => self.observer.invalidation_failed(target, &err),
            }
        }
    }
}

impl std::fmt::Debug for PostService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
