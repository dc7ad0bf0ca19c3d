//! Application services layer.

pub mod accounts;
pub mod authz;
pub mod error;
pub mod identity;
pub mod password;
pub mod posts;
pub mod repos;
