mod postgres;

#[cfg(test)]
mod memory;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::articles::models::Article;

pub use postgres::PgArticleRepository;

#[cfg(test)]
pub use memory::InMemoryArticleRepository;

/// Storage access for articles
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>>;
}
