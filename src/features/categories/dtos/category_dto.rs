use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, CategoryChanges, CategoryFilter};
use crate::shared::tree::TreeNode;
use crate::shared::types::deserialize_some;

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: String,

    /// Derived from `name` when absent
    #[validate(
        length(max = 100, message = "Slug must not exceed 100 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase letters, digits and single hyphens"
        )
    )]
    pub slug: Option<String>,

    pub description: Option<String>,
    pub parent_id: Option<i64>,
    /// Default: 0
    pub display_order: Option<i32>,
    /// Default: true
    pub is_active: Option<bool>,
}

/// Request DTO for updating a category.
///
/// Absent fields are left untouched; `"parent_id": null` moves the category
/// to the root.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(
        length(max = 100, message = "Slug must not exceed 100 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase letters, digits and single hyphens"
        )
    )]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Option<i64>>,

    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl From<UpdateCategoryDto> for CategoryChanges {
    fn from(dto: UpdateCategoryDto) -> Self {
        Self {
            name: dto.name,
            slug: dto.slug,
            description: dto.description,
            parent_id: dto.parent_id,
            display_order: dto.display_order,
            is_active: dto.is_active,
        }
    }
}

/// One entry of a reorder request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryOrderDto {
    pub id: i64,
    pub display_order: i32,
}

/// Request DTO for reordering categories
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReorderCategoriesDto {
    pub categories: Vec<CategoryOrderDto>,
}

/// Query params for listing categories
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CategoryQueryParams {
    /// Parent category ID, or `null` for root categories
    pub parent_id: Option<String>,
    /// Filter by active flag
    pub is_active: Option<bool>,
    /// If true, return the active categories as a tree. Default: false (flat list)
    #[serde(default)]
    pub tree: bool,
}

impl CategoryQueryParams {
    pub fn filter(&self) -> Result<CategoryFilter> {
        let parent_id = match self.parent_id.as_deref() {
            None => None,
            Some("null") => Some(None),
            Some(raw) => Some(Some(raw.parse::<i64>().map_err(|_| {
                AppError::BadRequest(format!("Invalid parent_id: {}", raw))
            })?)),
        };

        Ok(CategoryFilter {
            parent_id,
            is_active: self.is_active,
        })
    }
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub parent_name: Option<String>,
    pub parent_slug: Option<String>,
    /// Number of linked news articles
    pub article_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            display_order: c.display_order,
            is_active: c.is_active,
            parent_name: c.parent_name,
            parent_slug: c.parent_slug,
            article_count: c.article_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    #[serde(flatten)]
    pub category: CategoryResponseDto,
    pub children: Vec<CategoryTreeDto>,
}

impl TreeNode for CategoryTreeDto {
    type Row = Category;

    fn from_row(row: Category) -> Self {
        Self {
            category: row.into(),
            children: Vec::new(),
        }
    }

    fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }
}

/// Flat or nested category listing
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryListingDto {
    Flat(Vec<CategoryResponseDto>),
    Tree(Vec<CategoryTreeDto>),
}

/// A category with its direct children
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetailDto {
    #[serde(flatten)]
    pub category: CategoryResponseDto,
    pub children: Vec<CategoryResponseDto>,
}
