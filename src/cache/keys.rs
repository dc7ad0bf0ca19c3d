//! Cache keys and invalidation planning.
//!
//! Key strings are part of the wire contract with other readers of the same
//! Redis database, so they are produced in exactly one place.

use std::fmt;

use crate::domain::types::{ActorId, PostId};

use super::config::InvalidationMode;

/// Coarse listing marker deleted in exact mode. Never read.
pub const ALL_POSTS_MARKER: &str = "all_posts";

/// A cached read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `post:{id}`
    Post(PostId),
    /// `all_posts:{offset}:{limit}`
    AllPosts { offset: u32, limit: u32 },
    /// `user_posts:{author}`
    UserPosts(ActorId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Post(id) => write!(f, "post:{id}"),
            CacheKey::AllPosts { offset, limit } => {
                write!(f, "{ALL_POSTS_MARKER}:{offset}:{limit}")
            }
            CacheKey::UserPosts(author) => write!(f, "user_posts:{author}"),
        }
    }
}

/// Something to delete after a committed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationTarget {
    Key(String),
    Pattern(String),
}

impl InvalidationTarget {
    pub fn key(key: impl fmt::Display) -> Self {
        Self::Key(key.to_string())
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            InvalidationTarget::Key(key) => key,
            InvalidationTarget::Pattern(pattern) => pattern,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InvalidationTarget::Key(_) => "key",
            InvalidationTarget::Pattern(_) => "pattern",
        }
    }
}

impl fmt::Display for InvalidationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.as_str())
    }
}

fn listing_targets(mode: InvalidationMode, author: ActorId) -> [InvalidationTarget; 2] {
    match mode {
        InvalidationMode::Exact => [
            InvalidationTarget::key(ALL_POSTS_MARKER),
            InvalidationTarget::key(CacheKey::UserPosts(author)),
        ],
        // `user_posts:12*` also matches author 123; the extra delete only costs a miss.
        InvalidationMode::Pattern => [
            InvalidationTarget::pattern(format!("{ALL_POSTS_MARKER}:*")),
            InvalidationTarget::pattern(format!("{}*", CacheKey::UserPosts(author))),
        ],
    }
}

/// Targets cleared after a post is created.
pub fn plan_create(mode: InvalidationMode, author: ActorId) -> Vec<InvalidationTarget> {
    listing_targets(mode, author).into()
}

/// Targets cleared after a post is updated or deleted.
pub fn plan_mutation(
    mode: InvalidationMode,
    id: PostId,
    author: ActorId,
) -> Vec<InvalidationTarget> {
    let mut targets = Vec::with_capacity(3);
    targets.push(InvalidationTarget::key(CacheKey::Post(id)));
    targets.extend(listing_targets(mode, author));
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_strings_are_stable() {
        assert_eq!(CacheKey::Post(42).to_string(), "post:42");
        assert_eq!(
            CacheKey::AllPosts {
                offset: 0,
                limit: 100
            }
            .to_string(),
            "all_posts:0:100"
        );
        assert_eq!(CacheKey::UserPosts(ActorId(7)).to_string(), "user_posts:7");
    }

    #[test]
    fn exact_create_plan_uses_marker_and_author_key() {
        let plan = plan_create(InvalidationMode::Exact, ActorId(7));
        assert_eq!(
            plan,
            vec![
                InvalidationTarget::Key("all_posts".into()),
                InvalidationTarget::Key("user_posts:7".into()),
            ]
        );
    }

    #[test]
    fn pattern_mutation_plan_covers_post_and_listings() {
        let plan = plan_mutation(InvalidationMode::Pattern, 3, ActorId(7));
        assert_eq!(
            plan,
            vec![
                InvalidationTarget::Key("post:3".into()),
                InvalidationTarget::Pattern("all_posts:*".into()),
                InvalidationTarget::Pattern("user_posts:7*".into()),
            ]
        );
    }

    #[test]
    fn target_display_names_kind() {
        assert_eq!(
            InvalidationTarget::pattern("all_posts:*").to_string(),
            "pattern(all_posts:*)"
        );
    }
}
