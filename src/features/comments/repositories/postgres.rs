use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::database::{constraint_violation, FOREIGN_KEY_VIOLATION};
use crate::core::error::{AppError, Result};
use crate::features::comments::models::{Comment, CommentFilter, CommentStats, NewComment};
use crate::features::comments::moderation::CommentStatus;
use crate::shared::tree::descendant_ids;

use super::CommentRepository;

const COMMENT_COLUMNS: &str =
    "id, article_id, parent_id, user_id, content, status, created_at, updated_at";

/// Convert database error to a more specific AppError
fn handle_db_error(context: &str, e: sqlx::Error) -> AppError {
    if let Some((code, constraint)) = constraint_violation(&e) {
        if code == FOREIGN_KEY_VIOLATION {
            let target = match constraint.as_deref() {
                Some(c) if c.contains("parent") => "Parent comment",
                Some(c) if c.contains("article") => "News article",
                _ => "Referenced record",
            };
            return AppError::NotFound(format!("{} not found", target));
        }
    }

    tracing::error!("{}: {:?}", context, e);
    AppError::Database(e)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &CommentFilter) {
    builder.push(" WHERE 1=1");
    if let Some(article_id) = filter.article_id {
        builder.push(" AND article_id = ").push_bind(article_id);
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if filter.top_level {
        builder.push(" AND parent_id IS NULL");
    } else if let Some(parent_id) = filter.parent_id {
        builder.push(" AND parent_id = ").push_bind(parent_id);
    }
    if let Some(status) = filter.effective_status() {
        builder.push(" AND status = ").push_bind(status);
    }
}

pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to get comment", e))
    }

    async fn list_for_article(
        &self,
        article_id: i64,
        include_unapproved: bool,
    ) -> Result<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {}
            FROM comments
            WHERE article_id = $1 AND ($2 OR status = 'approved')
            ORDER BY created_at ASC, id ASC
            "#,
            COMMENT_COLUMNS
        ))
        .bind(article_id)
        .bind(include_unapproved)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to list article comments", e))
    }

    async fn links_for_article(&self, article_id: i64) -> Result<Vec<(i64, Option<i64>)>> {
        sqlx::query_as("SELECT id, parent_id FROM comments WHERE article_id = $1")
            .bind(article_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to load comment links", e))
    }

    async fn list(&self, filter: &CommentFilter) -> Result<(Vec<Comment>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM comments");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to count comments", e))?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM comments",
            COMMENT_COLUMNS
        ));
        push_filters(&mut query, filter);
        query
            .push(format!(
                " ORDER BY created_at {}, id {}",
                filter.sort.as_sql(),
                filter.sort.as_sql()
            ))
            .push(" LIMIT ")
            .push_bind(filter.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filter.pagination.offset());

        let comments = query
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to list comments", e))?;

        Ok((comments, total))
    }

    async fn insert(&self, new: NewComment) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (article_id, parent_id, user_id, content, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(new.article_id)
        .bind(new.parent_id)
        .bind(new.user_id)
        .bind(&new.content)
        .bind(CommentStatus::INITIAL)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to create comment", e))
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to update comment", e))
    }

    async fn update_status(&self, id: i64, status: CommentStatus) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to update comment status", e))
    }

    async fn delete_subtree(&self, id: i64) -> Result<u64> {
        // Dropping `tx` without commit rolls everything back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| handle_db_error("Failed to begin transaction", e))?;

        let article_id: Option<i64> =
            sqlx::query_scalar("SELECT article_id FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| handle_db_error("Failed to get comment", e))?;

        let Some(article_id) = article_id else {
            return Ok(0);
        };

        // Replies always share their parent's article.
        let links: Vec<(i64, Option<i64>)> =
            sqlx::query_as("SELECT id, parent_id FROM comments WHERE article_id = $1")
                .bind(article_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| handle_db_error("Failed to load comment links", e))?;

        let mut ids = descendant_ids(&links, id);
        ids.push(id);

        let deleted = sqlx::query("DELETE FROM comments WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| handle_db_error("Failed to delete comments", e))?
            .rows_affected();

        tx.commit()
            .await
            .map_err(|e| handle_db_error("Failed to commit comment deletion", e))?;

        Ok(deleted)
    }

    async fn stats(&self, article_id: Option<i64>) -> Result<CommentStats> {
        sqlx::query_as::<_, CommentStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM comments
            WHERE $1::BIGINT IS NULL OR article_id = $1
            "#,
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to get comment stats", e))
    }
}
