//! Post cache layer.
//!
//! Read paths go through a deterministic [`CacheKey`]; write paths delete the
//! [`InvalidationTarget`]s planned for them once storage has committed.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! redis_url = "redis://localhost:6379/0"
//! ttl_seconds = 3600
//! invalidation = "pattern"   # or "exact"
//! memory_capacity = 10000     # entry bound without redis
//! ```

mod config;
mod keys;
mod lock;
mod memory;
pub mod metrics;
mod observer;
mod store;

pub(crate) use lock::{rw_read, rw_write};

pub use config::{CacheConfig, DEFAULT_MEMORY_CAPACITY, DEFAULT_TTL, InvalidationMode};
pub use keys::{ALL_POSTS_MARKER, CacheKey, InvalidationTarget, plan_create, plan_mutation};
pub use memory::{InMemoryCacheStore, compile_pattern, glob_match};
pub use observer::{InvalidationObserver, TracingInvalidationObserver};
pub use store::{CacheAdapter, CacheError, CacheStore};
