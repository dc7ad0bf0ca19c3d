//! Partial updates for posts.

use serde::Deserialize;
use time::OffsetDateTime;

use crate::domain::entities::PostRecord;

/// Fields a post owner may change.
///
/// A provided value overrides the stored one, an absent value preserves it.
/// `author_id` is deliberately not representable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl PostPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Apply the patch in place and refresh `updated_at`.
    pub fn apply_to(&self, post: &mut PostRecord, now: OffsetDateTime) {
        if let Some(title) = self.title.as_ref() {
            post.title.clone_from(title);
        }
        if let Some(content) = self.content.as_ref() {
            post.content.clone_from(content);
        }
        post.updated_at = now;
    }
}
