use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::core::error::Result;
use crate::features::articles::models::{Article, ArticleStatus};

use super::ArticleRepository;

/// Article store backed by a map, for tests
#[derive(Default)]
pub struct InMemoryArticleRepository {
    articles: RwLock<HashMap<i64, Article>>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(
        &self,
        id: i64,
        status: ArticleStatus,
        published_at: Option<DateTime<Utc>>,
    ) -> Article {
        let article = Article {
            id,
            status,
            published_at,
        };
        self.articles.write().await.insert(id, article.clone());
        article
    }

    pub async fn insert_published(&self, id: i64) -> Article {
        self.insert(id, ArticleStatus::Published, None).await
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>> {
        Ok(self.articles.read().await.get(&id).cloned())
    }
}
