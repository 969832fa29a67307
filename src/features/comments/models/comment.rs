use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::comments::moderation::CommentStatus;
use crate::shared::tree::TreeRow;
use crate::shared::types::{PaginationQuery, SortDirection};

/// Database model for comment
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreeRow for Comment {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }
}

/// Insert payload; status is always the initial moderation state
#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub content: String,
}

/// Filters for flat comment listings
#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub article_id: Option<i64>,
    pub user_id: Option<i64>,
    pub parent_id: Option<i64>,
    /// Only comments without a parent
    pub top_level: bool,
    /// Exact status; when absent, `include_unapproved` decides
    pub status: Option<CommentStatus>,
    pub include_unapproved: bool,
    pub sort: SortDirection,
    pub pagination: PaginationQuery,
}

impl CommentFilter {
    /// The status constraint the listing must apply, if any
    pub fn effective_status(&self) -> Option<CommentStatus> {
        match self.status {
            Some(status) => Some(status),
            None if self.include_unapproved => None,
            None => Some(CommentStatus::Approved),
        }
    }
}

/// Per-status counters
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct CommentStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}
