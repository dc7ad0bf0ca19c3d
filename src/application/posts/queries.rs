use crate::cache::CacheKey;
use crate::domain::entities::PostRecord;
use crate::domain::types::{ActorId, PostId};

use super::service::PostService;
use super::types::PostServiceError;

impl PostService {
    pub async fn list_all(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<PostRecord>, PostServiceError> {
        let posts = self
            .read_through(CacheKey::AllPosts { offset, limit }, || async {
                self.repo.list_posts(offset, limit).await.map(Some)
            })
            .await?;
        Ok(posts.unwrap_or_default())
    }

    pub async fn list_by_author(
        &self,
        author: ActorId,
    ) -> Result<Vec<PostRecord>, PostServiceError> {
        let posts = self
            .read_through(CacheKey::UserPosts(author), || async {
                self.repo.list_by_author(author).await.map(Some)
            })
            .await?;
        Ok(posts.unwrap_or_default())
    }

    pub async fn get_by_id(&self, id: PostId) -> Result<PostRecord, PostServiceError> {
        self.read_through(CacheKey::Post(id), || self.repo.find_by_id(id))
            .await?
            .ok_or(PostServiceError::NotFound)
    }
}
