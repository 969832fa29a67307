use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Article status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "article_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

/// Database model for the parts of an article the comment engine reads
#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: i64,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Published and not scheduled for later
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ArticleStatus::Published && self.published_at.map_or(true, |at| at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn article(status: ArticleStatus, published_at: Option<DateTime<Utc>>) -> Article {
        Article {
            id: 1,
            status,
            published_at,
        }
    }

    #[test]
    fn test_only_published_and_due_articles_are_published() {
        let now = Utc::now();
        assert!(article(ArticleStatus::Published, None).is_published_at(now));
        assert!(article(ArticleStatus::Published, Some(now - Duration::hours(1))).is_published_at(now));
        assert!(!article(ArticleStatus::Published, Some(now + Duration::hours(1))).is_published_at(now));
        assert!(!article(ArticleStatus::Draft, None).is_published_at(now));
        assert!(!article(ArticleStatus::Archived, None).is_published_at(now));
    }
}
