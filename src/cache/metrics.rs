//! Metric names emitted by the cache layer.

pub const CACHE_HIT_TOTAL: &str = "blogline_cache_hit_total";
pub const CACHE_MISS_TOTAL: &str = "blogline_cache_miss_total";
/// Labelled with `op` (`get`, `set`).
pub const CACHE_ERROR_TOTAL: &str = "blogline_cache_error_total";
/// Labelled with `kind` (`key`, `pattern`).
pub const CACHE_INVALIDATION_FAILED_TOTAL: &str = "blogline_cache_invalidation_failed_total";
