use tracing::info;

use crate::application::authz::authorize_mutation;
use crate::application::repos::CreatePostParams;
use crate::cache::{plan_create, plan_mutation};
use crate::domain::entities::PostRecord;
use crate::domain::posts::PostPatch;
use crate::domain::types::{ActorId, PostId};

use super::service::PostService;
use super::types::{CreatePostCommand, PostServiceError};

impl PostService {
    pub async fn create(
        &self,
        author: ActorId,
        command: CreatePostCommand,
    ) -> Result<PostRecord, PostServiceError> {
        let params = CreatePostParams {
            title: command.title,
            content: command.content,
            author_id: author,
        };
        let post = self.repo.create_post(params).await?;

        self.invalidate(&plan_create(self.config.invalidation, author))
            .await;

        info!(
            target = "blogline::posts",
            post_id = post.id,
            author = %author,
            "post created"
        );
        Ok(post)
    }

    pub async fn update(
        &self,
        id: PostId,
        actor: ActorId,
        patch: PostPatch,
    ) -> Result<PostRecord, PostServiceError> {
        self.load_owned(id, actor).await?;

        let post = self.repo.update_post(id, &patch).await?;

        self.invalidate(&plan_mutation(self.config.invalidation, id, actor))
            .await;

        info!(
            target = "blogline::posts",
            post_id = id,
            actor = %actor,
            "post updated"
        );
        Ok(post)
    }

    pub async fn delete(&self, id: PostId, actor: ActorId) -> Result<(), PostServiceError> {
        self.load_owned(id, actor).await?;

        self.repo.delete_post(id).await?;

        self.invalidate(&plan_mutation(self.config.invalidation, id, actor))
            .await;

        info!(
            target = "blogline::posts",
            post_id = id,
            actor = %actor,
            "post deleted"
        );
        Ok(())
    }

    /// Load `id` from storage, bypassing the cache, and check `actor` owns it.
    async fn load_owned(&self, id: PostId, actor: ActorId) -> Result<PostRecord, PostServiceError> {
        let post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(PostServiceError::NotFound)?;

        if !authorize_mutation(actor, post.author()).is_allowed() {
            return Err(PostServiceError::Forbidden);
        }
        Ok(post)
    }
}
