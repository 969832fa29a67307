mod postgres;

#[cfg(test)]
mod memory;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::comments::models::{Comment, CommentFilter, CommentStats, NewComment};
use crate::features::comments::moderation::CommentStatus;

pub use postgres::PgCommentRepository;

#[cfg(test)]
pub use memory::InMemoryCommentRepository;

/// Storage access for comments
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Every comment of an article, oldest first (ties broken by id).
    /// Only approved rows unless `include_unapproved`.
    async fn list_for_article(&self, article_id: i64, include_unapproved: bool)
        -> Result<Vec<Comment>>;

    /// `(id, parent_id)` of every comment on an article, any status
    async fn links_for_article(&self, article_id: i64) -> Result<Vec<(i64, Option<i64>)>>;

    /// One page of comments plus the total row count for the filter
    async fn list(&self, filter: &CommentFilter) -> Result<(Vec<Comment>, i64)>;

    async fn insert(&self, new: NewComment) -> Result<Comment>;

    async fn update_content(&self, id: i64, content: &str) -> Result<Option<Comment>>;

    async fn update_status(&self, id: i64, status: CommentStatus) -> Result<Option<Comment>>;

    /// Delete a comment and all of its descendant replies atomically.
    /// Returns the number of removed rows (0 if `id` does not exist).
    async fn delete_subtree(&self, id: i64) -> Result<u64>;

    async fn stats(&self, article_id: Option<i64>) -> Result<CommentStats>;
}
