use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryDetailDto, CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryFilter, NewCategory,
};
use crate::features::categories::repositories::CategoryRepository;
use crate::shared::constants::{MAX_TREE_DEPTH, RESERVED_CATEGORY_SLUGS};
use crate::shared::tree::{build_forest, depth_of, subtree_height, would_create_cycle};
use crate::shared::validation::slugify;

/// Refuse a write that would push the hierarchy past `MAX_TREE_DEPTH` levels
fn ensure_depth(levels: usize) -> Result<()> {
    if levels > MAX_TREE_DEPTH {
        return Err(AppError::Validation(format!(
            "Categories cannot be nested more than {} levels deep",
            MAX_TREE_DEPTH
        )));
    }
    Ok(())
}

/// Service for the category hierarchy
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    async fn require_category(&self, id: i64) -> Result<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    async fn require_parent(&self, parent_id: i64) -> Result<Category> {
        self.categories
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Parent category {} not found", parent_id)))
    }

    async fn ensure_slug_free(&self, slug: &str) -> Result<()> {
        if RESERVED_CATEGORY_SLUGS.contains(&slug) {
            return Err(AppError::Validation(format!(
                "Slug '{}' is reserved, choose another one",
                slug
            )));
        }
        if self.categories.find_by_slug(slug).await?.is_some() {
            return Err(AppError::DuplicateSlug(format!(
                "Category with slug '{}' already exists",
                slug
            )));
        }
        Ok(())
    }

    async fn children_of(&self, id: i64) -> Result<Vec<CategoryResponseDto>> {
        let filter = CategoryFilter {
            parent_id: Some(Some(id)),
            is_active: None,
        };
        let children = self.categories.list(&filter).await?;
        Ok(children.into_iter().map(Into::into).collect())
    }

    /// Flat list ordered by `display_order`, then `name`
    pub async fn list(&self, filter: CategoryFilter) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.categories.list(&filter).await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Category forest. With `active_only`, an inactive category hides its
    /// whole subtree.
    pub async fn get_tree(&self, active_only: bool) -> Result<Vec<CategoryTreeDto>> {
        let filter = CategoryFilter {
            parent_id: None,
            is_active: active_only.then_some(true),
        };
        let categories = self.categories.list(&filter).await?;
        Ok(build_forest(categories, MAX_TREE_DEPTH))
    }

    /// Look up by numeric id, or by slug for anything else
    pub async fn get(&self, id_or_slug: &str) -> Result<CategoryDetailDto> {
        let category = match id_or_slug.parse::<i64>() {
            Ok(id) => self.categories.find_by_id(id).await?,
            Err(_) => self.categories.find_by_slug(id_or_slug).await?,
        }
        .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id_or_slug)))?;

        let children = self.children_of(category.id).await?;
        Ok(CategoryDetailDto {
            category: category.into(),
            children,
        })
    }

    pub async fn children(&self, id: i64) -> Result<Vec<CategoryResponseDto>> {
        self.require_category(id).await?;
        self.children_of(id).await
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }

        let slug = match dto.slug {
            Some(slug) => slug,
            None => slugify(&name),
        };
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Cannot derive a slug from the category name, provide one explicitly".to_string(),
            ));
        }

        self.ensure_slug_free(&slug).await?;

        if let Some(parent_id) = dto.parent_id {
            self.require_parent(parent_id).await?;
            let links = self.categories.parent_links().await?;
            ensure_depth(depth_of(parent_id, &links) + 1)?;
        }

        let category = self
            .categories
            .insert(NewCategory {
                name,
                slug,
                description: dto.description,
                parent_id: dto.parent_id,
                display_order: dto.display_order.unwrap_or(0),
                is_active: dto.is_active.unwrap_or(true),
            })
            .await?;

        tracing::info!(
            "Category created: id={}, slug={}, parent_id={:?}",
            category.id,
            category.slug,
            category.parent_id
        );

        Ok(category.into())
    }

    /// Partial update. Reparenting is refused when the new parent is the
    /// category itself or one of its descendants.
    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let existing = self.require_category(id).await?;
        let mut changes = CategoryChanges::from(dto);

        if let Some(name) = changes.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation("Category name is required".to_string()));
            }
            changes.name = Some(name);
        }

        if let Some(slug) = &changes.slug {
            if *slug != existing.slug {
                self.ensure_slug_free(slug).await?;
            }
        }

        if let Some(Some(parent_id)) = changes.parent_id {
            if parent_id != id {
                self.require_parent(parent_id).await?;
            }
            let links = self.categories.parent_links().await?;
            if would_create_cycle(id, parent_id, &links) {
                return Err(AppError::CircularReference(
                    "Cannot set parent category: would create circular reference".to_string(),
                ));
            }
            ensure_depth(depth_of(parent_id, &links) + subtree_height(&links, id))?;
        }

        let category = self
            .categories
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        tracing::info!("Category updated: id={}", id);

        Ok(category.into())
    }

    /// Hard delete of a childless category without linked articles
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.require_category(id).await?;

        if self.categories.has_children(id).await? {
            return Err(AppError::HasChildren(
                "Cannot delete category with child categories".to_string(),
            ));
        }

        if self.categories.has_articles(id).await? {
            return Err(AppError::HasArticles(
                "Cannot delete category with associated news articles".to_string(),
            ));
        }

        if !self.categories.delete(id).await? {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        tracing::info!("Category deleted: id={}", id);

        Ok(())
    }

    /// Soft delete
    pub async fn deactivate(&self, id: i64) -> Result<CategoryResponseDto> {
        let changes = CategoryChanges {
            is_active: Some(false),
            ..Default::default()
        };
        let category = self
            .categories
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        tracing::info!("Category deactivated: id={}", id);

        Ok(category.into())
    }

    pub async fn reorder(&self, orders: Vec<(i64, i32)>) -> Result<()> {
        if orders.is_empty() {
            return Err(AppError::Validation(
                "Categories array is required".to_string(),
            ));
        }

        self.categories.reorder(&orders).await?;

        tracing::info!("Categories reordered: count={}", orders.len());

        Ok(())
    }
}
