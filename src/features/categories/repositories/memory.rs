use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryFilter, NewCategory,
};

use super::CategoryRepository;

#[derive(Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<i64, Category>,
    /// `(article_id, category_id)` links
    article_links: HashSet<(i64, i64)>,
}

impl State {
    fn slug_taken(&self, slug: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }

    /// Row with the derived columns recomputed
    fn view(&self, id: i64) -> Option<Category> {
        let mut category = self.rows.get(&id)?.clone();
        let parent = category.parent_id.and_then(|p| self.rows.get(&p));
        category.parent_name = parent.map(|p| p.name.clone());
        category.parent_slug = parent.map(|p| p.slug.clone());
        category.article_count = self
            .article_links
            .iter()
            .filter(|(_, category_id)| *category_id == id)
            .count() as i64;
        Some(category)
    }
}

/// Category store backed by an ordered map, for tests
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    state: Mutex<State>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn link_article(&self, article_id: i64, category_id: i64) {
        self.state
            .lock()
            .await
            .article_links
            .insert((article_id, category_id));
    }

    /// Overwrite a parent link directly, skipping every integrity check
    pub async fn force_parent(&self, id: i64, parent_id: Option<i64>) {
        if let Some(category) = self.state.lock().await.rows.get_mut(&id) {
            category.parent_id = parent_id;
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Category> = state
            .rows
            .keys()
            .filter_map(|&id| state.view(id))
            .filter(|c| filter.parent_id.map_or(true, |p| c.parent_id == p))
            .filter(|c| filter.is_active.map_or(true, |a| c.is_active == a))
            .collect();
        rows.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.state.lock().await.view(id))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let state = self.state.lock().await;
        let id = state.rows.values().find(|c| c.slug == slug).map(|c| c.id);
        Ok(id.and_then(|id| state.view(id)))
    }

    async fn parent_links(&self) -> Result<HashMap<i64, Option<i64>>> {
        let state = self.state.lock().await;
        Ok(state.rows.values().map(|c| (c.id, c.parent_id)).collect())
    }

    async fn has_children(&self, id: i64) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.rows.values().any(|c| c.parent_id == Some(id)))
    }

    async fn has_articles(&self, id: i64) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.article_links.iter().any(|(_, c)| *c == id))
    }

    async fn insert(&self, new: NewCategory) -> Result<Category> {
        let mut state = self.state.lock().await;
        if state.slug_taken(&new.slug, None) {
            return Err(AppError::DuplicateSlug(
                "Category with this slug already exists".to_string(),
            ));
        }

        state.next_id += 1;
        let now = Utc::now();
        let category = Category {
            id: state.next_id,
            parent_id: new.parent_id,
            name: new.name,
            slug: new.slug,
            description: new.description,
            display_order: new.display_order,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
            parent_name: None,
            parent_slug: None,
            article_count: 0,
        };
        let id = category.id;
        state.rows.insert(id, category);
        state
            .view(id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    async fn update(&self, id: i64, changes: &CategoryChanges) -> Result<Option<Category>> {
        let mut state = self.state.lock().await;
        if let Some(slug) = &changes.slug {
            if state.slug_taken(slug, Some(id)) {
                return Err(AppError::DuplicateSlug(
                    "Category with this slug already exists".to_string(),
                ));
            }
        }

        let Some(category) = state.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            category.name = name.clone();
        }
        if let Some(slug) = &changes.slug {
            category.slug = slug.clone();
        }
        if let Some(description) = &changes.description {
            category.description = description.clone();
        }
        if let Some(parent_id) = changes.parent_id {
            category.parent_id = parent_id;
        }
        if let Some(display_order) = changes.display_order {
            category.display_order = display_order;
        }
        if let Some(is_active) = changes.is_active {
            category.is_active = is_active;
        }
        category.updated_at = Utc::now();

        Ok(state.view(id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.rows.values().any(|c| c.parent_id == Some(id)) {
            return Err(AppError::HasChildren(
                "Cannot delete category with child categories".to_string(),
            ));
        }
        if state.article_links.iter().any(|(_, c)| *c == id) {
            return Err(AppError::HasArticles(
                "Cannot delete category with associated news articles".to_string(),
            ));
        }
        Ok(state.rows.remove(&id).is_some())
    }

    async fn reorder(&self, orders: &[(i64, i32)]) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(&(missing, _)) = orders.iter().find(|(id, _)| !state.rows.contains_key(id)) {
            return Err(AppError::NotFound(format!("Category {} not found", missing)));
        }

        let now = Utc::now();
        for &(id, display_order) in orders {
            if let Some(category) = state.rows.get_mut(&id) {
                category.display_order = display_order;
                category.updated_at = now;
            }
        }
        Ok(())
    }
}
