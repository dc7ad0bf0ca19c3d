//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{PostRecord, UserRecord};
use crate::domain::posts::PostPatch;
use crate::domain::types::{ActorId, PostId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub title: String,
    pub content: String,
    pub author_id: ActorId,
}

/// Storage contract for posts. Implementations know nothing about caching.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn find_by_id(&self, id: PostId) -> Result<Option<PostRecord>, RepoError>;

    /// Posts ordered by id, skipping `offset` and returning at most `limit`.
    async fn list_posts(&self, offset: u32, limit: u32) -> Result<Vec<PostRecord>, RepoError>;

    /// All posts of one author ordered by id.
    async fn list_by_author(&self, author_id: ActorId) -> Result<Vec<PostRecord>, RepoError>;

    /// Apply `patch`, refreshing `updated_at`. Returns `RepoError::NotFound` when absent.
    async fn update_post(&self, id: PostId, patch: &PostPatch) -> Result<PostRecord, RepoError>;

    /// Returns `RepoError::NotFound` when absent.
    async fn delete_post(&self, id: PostId) -> Result<(), RepoError>;

    /// Cheap round trip proving the store is reachable.
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// A new account. `email` is already normalized and `password_hash` is a PHC string.
#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// Storage contract for accounts. Email and username are each unique.
#[async_trait]
pub trait UsersRepo: Send + Sync {
    /// Returns `RepoError::InvalidInput` when email or username is taken.
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;
}
