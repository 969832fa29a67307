mod postgres;

#[cfg(test)]
mod memory;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryFilter, NewCategory,
};

pub use postgres::PgCategoryRepository;

#[cfg(test)]
pub use memory::InMemoryCategoryRepository;

/// Storage access for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Matching categories ordered by `display_order`, then `name`
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// `id -> parent_id` for every category
    async fn parent_links(&self) -> Result<HashMap<i64, Option<i64>>>;

    async fn has_children(&self, id: i64) -> Result<bool>;

    async fn has_articles(&self, id: i64) -> Result<bool>;

    /// Fails with `DuplicateSlug` when the slug is taken
    async fn insert(&self, new: NewCategory) -> Result<Category>;

    /// Fails with `DuplicateSlug` when the new slug is taken
    async fn update(&self, id: i64, changes: &CategoryChanges) -> Result<Option<Category>>;

    /// Hard delete; `false` if `id` does not exist
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Apply every `(id, display_order)` pair or none of them.
    /// An unknown id fails the batch with `NotFound`.
    async fn reorder(&self, orders: &[(i64, i32)]) -> Result<()>;
}
