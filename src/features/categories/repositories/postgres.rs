use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::database::{constraint_violation, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};
use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryFilter, NewCategory,
};

use super::CategoryRepository;

const CATEGORY_SELECT: &str = r#"
    SELECT c.id, c.parent_id, c.name, c.slug, c.description, c.display_order, c.is_active,
           c.created_at, c.updated_at,
           p.name AS parent_name,
           p.slug AS parent_slug,
           (SELECT COUNT(*) FROM article_categories ac WHERE ac.category_id = c.id) AS article_count
    FROM categories c
    LEFT JOIN categories p ON p.id = c.parent_id
"#;

const CATEGORY_ORDER: &str = " ORDER BY c.display_order ASC, c.name ASC";

/// Convert database error to a more specific AppError
fn handle_db_error(context: &str, e: sqlx::Error) -> AppError {
    if let Some((code, constraint)) = constraint_violation(&e) {
        if code == UNIQUE_VIOLATION && constraint.as_deref() == Some("categories_slug_key") {
            return AppError::DuplicateSlug("Category with this slug already exists".to_string());
        }
    }

    tracing::error!("{}: {:?}", context, e);
    AppError::Database(e)
}

/// Rows still referencing a category block its deletion
fn handle_delete_error(e: sqlx::Error) -> AppError {
    if let Some((code, constraint)) = constraint_violation(&e) {
        if code == FOREIGN_KEY_VIOLATION {
            match constraint.as_deref() {
                Some("categories_parent_id_fkey") => {
                    return AppError::HasChildren(
                        "Cannot delete category with child categories".to_string(),
                    );
                }
                Some("article_categories_category_id_fkey") => {
                    return AppError::HasArticles(
                        "Cannot delete category with associated news articles".to_string(),
                    );
                }
                _ => {}
            }
        }
    }

    handle_db_error("Failed to delete category", e)
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let mut query = QueryBuilder::<Postgres>::new(CATEGORY_SELECT);
        query.push(" WHERE 1=1");
        match filter.parent_id {
            Some(Some(parent_id)) => {
                query.push(" AND c.parent_id = ").push_bind(parent_id);
            }
            Some(None) => {
                query.push(" AND c.parent_id IS NULL");
            }
            None => {}
        }
        if let Some(is_active) = filter.is_active {
            query.push(" AND c.is_active = ").push_bind(is_active);
        }
        query.push(CATEGORY_ORDER);

        query
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to list categories", e))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(&format!("{} WHERE c.id = $1", CATEGORY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to get category", e))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(&format!("{} WHERE c.slug = $1", CATEGORY_SELECT))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to get category by slug", e))
    }

    async fn parent_links(&self) -> Result<HashMap<i64, Option<i64>>> {
        let rows: Vec<(i64, Option<i64>)> = sqlx::query_as("SELECT id, parent_id FROM categories")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to load category links", e))?;

        Ok(rows.into_iter().collect())
    }

    async fn has_children(&self, id: i64) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE parent_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to check child categories", e))
    }

    async fn has_articles(&self, id: i64) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM article_categories WHERE category_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to check category articles", e))
    }

    async fn insert(&self, new: NewCategory) -> Result<Category> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO categories (name, slug, description, parent_id, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(new.parent_id)
        .bind(new.display_order)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to create category", e))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    async fn update(&self, id: i64, changes: &CategoryChanges) -> Result<Option<Category>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE categories SET updated_at = NOW()");
        if let Some(name) = &changes.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(slug) = &changes.slug {
            query.push(", slug = ").push_bind(slug);
        }
        if let Some(description) = &changes.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(parent_id) = changes.parent_id {
            query.push(", parent_id = ").push_bind(parent_id);
        }
        if let Some(display_order) = changes.display_order {
            query.push(", display_order = ").push_bind(display_order);
        }
        if let Some(is_active) = changes.is_active {
            query.push(", is_active = ").push_bind(is_active);
        }
        query.push(" WHERE id = ").push_bind(id);

        let updated = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to update category", e))?
            .rows_affected();

        if updated == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_delete_error)?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn reorder(&self, orders: &[(i64, i32)]) -> Result<()> {
        // Dropping `tx` without commit rolls every update back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| handle_db_error("Failed to begin transaction", e))?;

        for &(id, display_order) in orders {
            let updated = sqlx::query(
                "UPDATE categories SET display_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(display_order)
            .execute(&mut *tx)
            .await
            .map_err(|e| handle_db_error("Failed to reorder categories", e))?
            .rows_affected();

            if updated == 0 {
                return Err(AppError::NotFound(format!("Category {} not found", id)));
            }
        }

        tx.commit()
            .await
            .map_err(|e| handle_db_error("Failed to commit category reorder", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn category(repo: &PgCategoryRepository, slug: &str, parent_id: Option<i64>) -> i64 {
        repo.insert(NewCategory {
            name: slug.to_string(),
            slug: slug.to_string(),
            description: None,
            parent_id,
            display_order: 0,
            is_active: true,
        })
        .await
        .unwrap()
        .id
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_reorder_with_unknown_id_applies_nothing(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        let news = category(&repo, "news", None).await;
        let sport = category(&repo, "sport", None).await;

        let err = repo.reorder(&[(news, 5), (999, 1)]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(repo.find_by_id(news).await.unwrap().unwrap().display_order, 0);

        repo.reorder(&[(news, 2), (sport, 1)]).await.unwrap();
        let slugs: Vec<String> = repo
            .list(&CategoryFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.slug)
            .collect();
        assert_eq!(slugs, ["sport", "news"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_delete_blocked_by_children_and_articles(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool.clone());
        let news = category(&repo, "news", None).await;
        let local = category(&repo, "local", Some(news)).await;

        let err = repo.delete(news).await.unwrap_err();
        assert!(matches!(err, AppError::HasChildren(_)));

        let article_id: i64 = sqlx::query_scalar(
            "INSERT INTO articles (title, slug) VALUES ('Flood', 'flood') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO article_categories (article_id, category_id) VALUES ($1, $2)")
            .bind(article_id)
            .bind(local)
            .execute(&pool)
            .await
            .unwrap();

        let err = repo.delete(local).await.unwrap_err();
        assert!(matches!(err, AppError::HasArticles(_)));
        assert_eq!(repo.find_by_id(local).await.unwrap().unwrap().article_count, 1);

        sqlx::query("DELETE FROM article_categories")
            .execute(&pool)
            .await
            .unwrap();
        assert!(repo.delete(local).await.unwrap());
        assert!(repo.delete(news).await.unwrap());
        assert!(!repo.delete(news).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at Postgres"]
    async fn test_duplicate_slug_maps_to_duplicate_slug(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        category(&repo, "news", None).await;

        let err = repo
            .insert(NewCategory {
                name: "News again".to_string(),
                slug: "news".to_string(),
                description: None,
                parent_id: None,
                display_order: 0,
                is_active: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug(_)));
    }
}
