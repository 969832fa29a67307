use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::core::error::Result;
use crate::features::comments::models::{Comment, CommentFilter, CommentStats, NewComment};
use crate::features::comments::moderation::CommentStatus;
use crate::shared::tree::descendant_ids;
use crate::shared::types::SortDirection;

use super::CommentRepository;

#[derive(Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<i64, Comment>,
}

/// Comment store backed by an ordered map, for tests
#[derive(Default)]
pub struct InMemoryCommentRepository {
    state: Mutex<State>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row with an arbitrary status, bypassing the workflow
    pub async fn seed(
        &self,
        article_id: i64,
        parent_id: Option<i64>,
        user_id: i64,
        status: CommentStatus,
    ) -> Comment {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: state.next_id,
            article_id,
            parent_id,
            user_id,
            content: format!("Seeded comment {}", state.next_id),
            status,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(comment.id, comment.clone());
        comment
    }

    pub async fn row_count(&self) -> usize {
        self.state.lock().await.rows.len()
    }
}

fn matches(filter: &CommentFilter, comment: &Comment) -> bool {
    if filter.article_id.is_some_and(|id| comment.article_id != id) {
        return false;
    }
    if filter.user_id.is_some_and(|id| comment.user_id != id) {
        return false;
    }
    if filter.top_level {
        if comment.parent_id.is_some() {
            return false;
        }
    } else if filter.parent_id.is_some() && comment.parent_id != filter.parent_id {
        return false;
    }
    match filter.effective_status() {
        Some(status) => comment.status == status,
        None => true,
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.state.lock().await.rows.get(&id).cloned())
    }

    async fn list_for_article(
        &self,
        article_id: i64,
        include_unapproved: bool,
    ) -> Result<Vec<Comment>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Comment> = state
            .rows
            .values()
            .filter(|c| c.article_id == article_id)
            .filter(|c| include_unapproved || c.status.is_public())
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.created_at, c.id));
        Ok(rows)
    }

    async fn links_for_article(&self, article_id: i64) -> Result<Vec<(i64, Option<i64>)>> {
        let state = self.state.lock().await;
        Ok(state
            .rows
            .values()
            .filter(|c| c.article_id == article_id)
            .map(|c| (c.id, c.parent_id))
            .collect())
    }

    async fn list(&self, filter: &CommentFilter) -> Result<(Vec<Comment>, i64)> {
        let state = self.state.lock().await;
        let mut rows: Vec<Comment> = state
            .rows
            .values()
            .filter(|c| matches(filter, c))
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.created_at, c.id));
        if filter.sort == SortDirection::Desc {
            rows.reverse();
        }

        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(filter.pagination.offset() as usize)
            .take(filter.pagination.limit() as usize)
            .collect();
        Ok((page, total))
    }

    async fn insert(&self, new: NewComment) -> Result<Comment> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: state.next_id,
            article_id: new.article_id,
            parent_id: new.parent_id,
            user_id: new.user_id,
            content: new.content,
            status: CommentStatus::INITIAL,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        let mut state = self.state.lock().await;
        Ok(state.rows.get_mut(&id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn update_status(&self, id: i64, status: CommentStatus) -> Result<Option<Comment>> {
        let mut state = self.state.lock().await;
        Ok(state.rows.get_mut(&id).map(|comment| {
            comment.status = status;
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete_subtree(&self, id: i64) -> Result<u64> {
        let mut state = self.state.lock().await;
        if !state.rows.contains_key(&id) {
            return Ok(0);
        }

        let links: Vec<(i64, Option<i64>)> =
            state.rows.values().map(|c| (c.id, c.parent_id)).collect();
        let mut ids = descendant_ids(&links, id);
        ids.push(id);

        let mut deleted = 0;
        for id in ids {
            if state.rows.remove(&id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn stats(&self, article_id: Option<i64>) -> Result<CommentStats> {
        let state = self.state.lock().await;
        let mut stats = CommentStats::default();
        for comment in state.rows.values() {
            if article_id.is_some_and(|id| comment.article_id != id) {
                continue;
            }
            stats.total += 1;
            match comment.status {
                CommentStatus::Pending => stats.pending += 1,
                CommentStatus::Approved => stats.approved += 1,
                CommentStatus::Rejected => stats.rejected += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_subtree_removes_descendants_only() {
        let repo = InMemoryCommentRepository::new();
        let root = repo.seed(1, None, 1, CommentStatus::Approved).await;
        let reply = repo.seed(1, Some(root.id), 2, CommentStatus::Approved).await;
        repo.seed(1, Some(reply.id), 3, CommentStatus::Pending).await;
        let other = repo.seed(1, None, 4, CommentStatus::Approved).await;

        assert_eq!(repo.delete_subtree(root.id).await.unwrap(), 3);
        assert_eq!(repo.row_count().await, 1);
        assert!(repo.find_by_id(other.id).await.unwrap().is_some());
        assert_eq!(repo.delete_subtree(root.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stats_scoped_to_article() {
        let repo = InMemoryCommentRepository::new();
        repo.seed(1, None, 1, CommentStatus::Pending).await;
        repo.seed(1, None, 1, CommentStatus::Approved).await;
        repo.seed(2, None, 1, CommentStatus::Rejected).await;

        let all = repo.stats(None).await.unwrap();
        assert_eq!((all.total, all.pending, all.approved, all.rejected), (3, 1, 1, 1));

        let scoped = repo.stats(Some(1)).await.unwrap();
        assert_eq!((scoped.total, scoped.rejected), (2, 0));
    }
}
