//! Host content lookups needed to resolve change events.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Comment, Post};

/// Read access to host content.
///
/// Lookups that fail for any reason report `None`; the policy then falls
/// back to its sentinel handling instead of erroring.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn post(&self, post_id: u64) -> Option<Post>;

    async fn comment(&self, comment_id: u64) -> Option<Comment>;
}

/// Fixed, in-memory content. Used by the replay command and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    posts: HashMap<u64, Post>,
    comments: HashMap<u64, Comment>,
}

impl StaticContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(mut self, post: Post) -> Self {
        self.posts.insert(post.id, post);
        self
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.insert(comment.id, comment);
        self
    }

    pub fn extend(
        &mut self,
        posts: impl IntoIterator<Item = Post>,
        comments: impl IntoIterator<Item = Comment>,
    ) {
        self.posts
            .extend(posts.into_iter().map(|post| (post.id, post)));
        self.comments
            .extend(comments.into_iter().map(|comment| (comment.id, comment)));
    }
}

#[async_trait]
impl ContentSource for StaticContent {
    async fn post(&self, post_id: u64) -> Option<Post> {
        self.posts.get(&post_id).cloned()
    }

    async fn comment(&self, comment_id: u64) -> Option<Comment> {
        self.comments.get(&comment_id).cloned()
    }
}
