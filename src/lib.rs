//! Blogline: token-authenticated post CRUD behind a read-through cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
