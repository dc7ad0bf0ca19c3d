//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

/// Lifetime of a cache entry when the caller does not pick one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Entry bound of the process-local store.
pub const DEFAULT_MEMORY_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10_000) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// How listing caches are cleared after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationMode {
    /// Exact-key deletes of `all_posts` and `user_posts:{author}`.
    ///
    /// Paginated `all_posts:{offset}:{limit}` entries are not matched and only
    /// expire through their ttl.
    Exact,
    /// Pattern deletes of `all_posts:*` and `user_posts:{author}*`.
    #[default]
    Pattern,
}

impl InvalidationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidationMode::Exact => "exact",
            InvalidationMode::Pattern => "pattern",
        }
    }
}

impl std::str::FromStr for InvalidationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "pattern" => Ok(Self::Pattern),
            other => Err(format!("unknown invalidation mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Lifetime applied to every populated entry.
    pub ttl: Duration,
    pub invalidation: InvalidationMode,
    /// Entry bound of the in-memory fallback store.
    pub memory_capacity: usize,
}

impl CacheConfig {
    /// Returns the memory capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            invalidation: InvalidationMode::default(),
            memory_capacity: DEFAULT_MEMORY_CAPACITY.get(),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl: settings.ttl,
            invalidation: settings.invalidation,
            memory_capacity: settings.memory_capacity.get(),
        }
    }
}
