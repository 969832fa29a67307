use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::comments::models::{Comment, CommentFilter, CommentStats};
use crate::features::comments::moderation::CommentStatus;
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::tree::TreeNode;
use crate::shared::types::{PaginationQuery, SortDirection};

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Request DTO for posting a comment or a reply.
///
/// There is no `status` field: new comments always wait for moderation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentDto {
    pub article_id: i64,
    /// Comment being replied to, must be approved and on the same article
    pub parent_id: Option<i64>,
    /// Trimmed length must be 3-5000 characters
    pub content: String,
}

/// Request DTO for editing a pending comment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCommentDto {
    pub content: String,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Query params for the public comment listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CommentQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    pub article_id: Option<i64>,
    pub user_id: Option<i64>,
    /// Direct replies of this comment
    pub parent_id: Option<i64>,
    /// Only comments that are not replies (overrides `parent_id`)
    #[serde(default)]
    pub top_level: bool,
    /// Creation time order (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl From<CommentQueryParams> for CommentFilter {
    fn from(q: CommentQueryParams) -> Self {
        Self {
            article_id: q.article_id,
            user_id: q.user_id,
            parent_id: q.parent_id,
            top_level: q.top_level,
            status: None,
            include_unapproved: false,
            sort: q.sort,
            pagination: PaginationQuery {
                page: q.page,
                limit: q.limit,
            },
        }
    }
}

/// Query params for the moderation queue
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AdminCommentQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// Filter by status (default: every status)
    pub status: Option<CommentStatus>,
    pub article_id: Option<i64>,
    pub user_id: Option<i64>,
    /// Sort direction (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl From<AdminCommentQueryParams> for CommentFilter {
    fn from(q: AdminCommentQueryParams) -> Self {
        Self {
            article_id: q.article_id,
            user_id: q.user_id,
            parent_id: None,
            top_level: false,
            status: q.status,
            include_unapproved: true,
            sort: q.sort,
            pagination: PaginationQuery {
                page: q.page,
                limit: q.limit,
            },
        }
    }
}

/// Query params for comment statistics
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CommentStatsQueryParams {
    /// Restrict counters to one article
    pub article_id: Option<i64>,
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

/// Response DTO for comment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: i64,
    pub article_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            article_id: c.article_id,
            parent_id: c.parent_id,
            user_id: c.user_id,
            content: c.content,
            status: c.status,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response DTO for a comment thread (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CommentTreeDto {
    #[serde(flatten)]
    pub comment: CommentResponseDto,
    pub replies: Vec<CommentTreeDto>,
}

impl TreeNode for CommentTreeDto {
    type Row = Comment;

    fn from_row(row: Comment) -> Self {
        Self {
            comment: row.into(),
            replies: Vec::new(),
        }
    }

    fn push_child(&mut self, child: Self) {
        self.replies.push(child);
    }
}

/// Response DTO for comment statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentStatsDto {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl From<CommentStats> for CommentStatsDto {
    fn from(s: CommentStats) -> Self {
        Self {
            total: s.total,
            pending: s.pending,
            approved: s.approved,
            rejected: s.rejected,
        }
    }
}
