//! Process-local repositories.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{
    CreatePostParams, CreateUserParams, PostsRepo, RepoError, UsersRepo,
};
use crate::cache::{rw_read, rw_write};
use crate::domain::entities::{PostRecord, UserRecord};
use crate::domain::posts::PostPatch;
use crate::domain::types::{ActorId, PostId};

const OWNER: &str = "infra::memory";

#[derive(Debug, Default)]
struct Table {
    last_id: PostId,
    rows: BTreeMap<PostId, PostRecord>,
}

/// [`PostsRepo`] over an ordered map. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryPostsRepo {
    table: RwLock<Table>,
}

impl InMemoryPostsRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        rw_read(&self.table, OWNER, "len").rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PostsRepo for InMemoryPostsRepo {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let mut table = rw_write(&self.table, OWNER, "create_post");
        table.last_id += 1;
        let post = PostRecord {
            id: table.last_id,
            title: params.title,
            content: params.content,
            author_id: params.author_id.get(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<PostRecord>, RepoError> {
        Ok(rw_read(&self.table, OWNER, "find_by_id")
            .rows
            .get(&id)
            .cloned())
    }

    async fn list_posts(&self, offset: u32, limit: u32) -> Result<Vec<PostRecord>, RepoError> {
        Ok(rw_read(&self.table, OWNER, "list_posts")
            .rows
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_by_author(&self, author_id: ActorId) -> Result<Vec<PostRecord>, RepoError> {
        Ok(rw_read(&self.table, OWNER, "list_by_author")
            .rows
            .values()
            .filter(|post| post.author() == author_id)
            .cloned()
            .collect())
    }

    async fn update_post(&self, id: PostId, patch: &PostPatch) -> Result<PostRecord, RepoError> {
        let mut table = rw_write(&self.table, OWNER, "update_post");
        let post = table.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        patch.apply_to(post, OffsetDateTime::now_utc());
        Ok(post.clone())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), RepoError> {
        rw_write(&self.table, OWNER, "delete_post")
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[derive(Debug, Default)]
struct Accounts {
    last_id: i64,
    rows: BTreeMap<i64, UserRecord>,
}

/// [`UsersRepo`] with the same uniqueness rules as the `users` table.
#[derive(Debug, Default)]
pub struct InMemoryUsersRepo {
    accounts: RwLock<Accounts>,
}

impl InMemoryUsersRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepo for InMemoryUsersRepo {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut accounts = rw_write(&self.accounts, OWNER, "create_user");
        if let Some(clash) = accounts
            .rows
            .values()
            .find(|user| user.email == params.email || user.username == params.username)
        {
            let column = if clash.email == params.email {
                "email"
            } else {
                "username"
            };
            return Err(RepoError::InvalidInput {
                message: format!("duplicate {column}"),
            });
        }

        accounts.last_id += 1;
        let user = UserRecord {
            id: accounts.last_id,
            email: params.email,
            username: params.username,
            password_hash: params.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        accounts.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(rw_read(&self.accounts, OWNER, "find_by_email")
            .rows
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(rw_read(&self.accounts, OWNER, "find_by_username")
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(title: &str, author: i64) -> CreatePostParams {
        CreatePostParams {
            title: title.to_string(),
            content: format!("{title} body"),
            author_id: ActorId(author),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_not_reused() {
        let repo = InMemoryPostsRepo::new();
        let first = repo.create_post(params("a", 1)).await.unwrap();
        repo.delete_post(first.id).await.unwrap();
        let second = repo.create_post(params("b", 1)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn listing_is_ordered_and_paginated() {
        let repo = InMemoryPostsRepo::new();
        for (title, author) in [("a", 1), ("b", 2), ("c", 1), ("d", 1)] {
            repo.create_post(params(title, author)).await.unwrap();
        }

        let page: Vec<_> = repo
            .list_posts(1, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.title)
            .collect();
        assert_eq!(page, vec!["b", "c"]);

        let mine: Vec<_> = repo
            .list_by_author(ActorId(1))
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.id)
            .collect();
        assert_eq!(mine, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let repo = InMemoryPostsRepo::new();
        let created = repo.create_post(params("a", 1)).await.unwrap();

        let updated = repo
            .update_post(created.id, &PostPatch::default().title("renamed"))
            .await
            .unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.author_id, 1);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let repo = InMemoryPostsRepo::new();
        assert!(repo.find_by_id(9).await.unwrap().is_none());
        assert!(matches!(
            repo.update_post(9, &PostPatch::default()).await,
            Err(RepoError::NotFound)
        ));
        assert!(matches!(repo.delete_post(9).await, Err(RepoError::NotFound)));
    }

    fn account(email: &str, username: &str) -> CreateUserParams {
        CreateUserParams {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn users_are_unique_by_email_and_username() {
        let repo = InMemoryUsersRepo::new();
        let first = repo.create_user(account("a@example.com", "a")).await.unwrap();
        assert_eq!(first.id, 1);

        for clash in [account("a@example.com", "b"), account("b@example.com", "a")] {
            assert!(matches!(
                repo.create_user(clash).await,
                Err(RepoError::InvalidInput { .. })
            ));
        }

        let found = repo.find_by_username("a").await.unwrap().unwrap();
        assert_eq!(found, first);
        assert!(repo.find_by_email("b@example.com").await.unwrap().is_none());
    }
}
