//! Cache-coordinated post service.
//!
//! Reads go through the cache and fall back to storage when the cache is
//! missing or failing. Writes hit storage first and only then delete the
//! affected cache entries.

mod commands;
mod queries;
mod service;
pub mod types;

pub use service::PostService;
pub use types::{CreatePostCommand, PostServiceError};
