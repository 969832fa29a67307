use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::shared::tree::TreeRow;

/// Database model for category, joined with its parent's label and the
/// number of linked articles
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub parent_name: Option<String>,
    pub parent_slug: Option<String>,
    pub article_count: i64,
}

impl TreeRow for Category {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }
}

/// Insert payload with defaults already applied
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub display_order: i32,
    pub is_active: bool,
}

/// Partial update; `None` leaves a column untouched.
///
/// Nullable columns use a nested option: `Some(None)` writes NULL.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub parent_id: Option<Option<i64>>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CategoryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.parent_id.is_none()
            && self.display_order.is_none()
            && self.is_active.is_none()
    }
}

/// Filters for flat category listings
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// `Some(None)` selects root categories
    pub parent_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
}
