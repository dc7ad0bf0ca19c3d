//! Reporting of invalidation failures.
//!
//! A failed delete never fails the write that triggered it. Whatever stale
//! entry survives will be served until its ttl runs out, so every failure is
//! handed to an observer instead.

use metrics::counter;
use tracing::warn;

use super::keys::InvalidationTarget;
use super::metrics::CACHE_INVALIDATION_FAILED_TOTAL;
use super::store::CacheError;

pub trait InvalidationObserver: Send + Sync {
    fn invalidation_failed(&self, target: &InvalidationTarget, error: &CacheError);
}

/// Logs at warn and bumps [`CACHE_INVALIDATION_FAILED_TOTAL`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInvalidationObserver;

impl InvalidationObserver for TracingInvalidationObserver {
    fn invalidation_failed(&self, target: &InvalidationTarget, error: &CacheError) {
        warn!(
            target = "blogline::cache::invalidation",
            kind = target.kind(),
            cache_target = target.as_str(),
            error = %error,
            "Cache invalidation failed; stale entry may be served until it expires"
        );
        counter!(CACHE_INVALIDATION_FAILED_TOTAL, "kind" => target.kind()).increment(1);
    }
}
