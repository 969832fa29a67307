use std::sync::Arc;

use chrono::Utc;

use crate::core::error::{AppError, Result};
use crate::features::articles::ArticleRepository;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{
    CommentResponseDto, CommentStatsDto, CommentTreeDto, CreateCommentDto, UpdateCommentDto,
};
use crate::features::comments::models::{Comment, CommentFilter, NewComment};
use crate::features::comments::moderation::ModerationAction;
use crate::features::comments::repositories::CommentRepository;
use crate::shared::constants::{MAX_TREE_DEPTH, MIN_COMMENT_LENGTH};
use crate::shared::tree::{build_forest, depth_of};
use crate::shared::types::Pagination;

/// Trim and length-check comment content
fn validate_content(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.chars().count() < MIN_COMMENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Comment must be at least {} characters",
            MIN_COMMENT_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Service for comment threads and their moderation
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, articles: Arc<dyn ArticleRepository>) -> Self {
        Self { comments, articles }
    }

    async fn require_comment(&self, id: i64) -> Result<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))
    }

    /// Comment forest of an article, oldest first at every level.
    ///
    /// Moderator-capable viewers see every status; everyone else sees approved
    /// comments only, and a reply whose parent is hidden is hidden with it.
    pub async fn list_for_article(
        &self,
        article_id: i64,
        viewer: Option<&AuthenticatedUser>,
    ) -> Result<Vec<CommentTreeDto>> {
        if self.articles.find_by_id(article_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "News article {} not found",
                article_id
            )));
        }

        let include_unapproved = viewer.is_some_and(|u| u.has_moderator_access());
        let rows = self
            .comments
            .list_for_article(article_id, include_unapproved)
            .await?;

        Ok(build_forest(rows, MAX_TREE_DEPTH))
    }

    /// Flat paginated listing
    pub async fn list(&self, filter: CommentFilter) -> Result<(Vec<CommentResponseDto>, Pagination)> {
        let (rows, total) = self.comments.list(&filter).await?;
        let pagination = Pagination::new(&filter.pagination, total);
        Ok((rows.into_iter().map(Into::into).collect(), pagination))
    }

    /// Single comment. Unmoderated or rejected comments are only visible to
    /// their author and to moderators.
    pub async fn get(&self, id: i64, viewer: &AuthenticatedUser) -> Result<CommentResponseDto> {
        let comment = self.require_comment(id).await?;

        let visible = comment.status.is_public()
            || comment.user_id == viewer.user_id
            || viewer.has_moderator_access();
        if !visible {
            return Err(AppError::Forbidden(
                "Not authorized to view this comment".to_string(),
            ));
        }

        Ok(comment.into())
    }

    /// Post a comment or a reply. Every new comment starts pending.
    pub async fn create(
        &self,
        author: &AuthenticatedUser,
        dto: CreateCommentDto,
    ) -> Result<CommentResponseDto> {
        let content = validate_content(&dto.content)?;

        let article = self
            .articles
            .find_by_id(dto.article_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("News article {} not found", dto.article_id))
            })?;

        if !article.is_published_at(Utc::now()) {
            return Err(AppError::InvalidState(
                "Cannot comment on unpublished article".to_string(),
            ));
        }

        if let Some(parent_id) = dto.parent_id {
            let parent = self
                .comments
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Parent comment {} not found", parent_id))
                })?;

            if !parent.status.accepts_replies() {
                return Err(AppError::InvalidState(
                    "Cannot reply to unapproved comment".to_string(),
                ));
            }

            if parent.article_id != article.id {
                return Err(AppError::Validation(
                    "Parent comment belongs to a different article".to_string(),
                ));
            }

            let links = self.comments.links_for_article(article.id).await?;
            let parents = links.into_iter().collect();
            if depth_of(parent_id, &parents) >= MAX_TREE_DEPTH {
                return Err(AppError::Validation(format!(
                    "Replies cannot be nested more than {} levels deep",
                    MAX_TREE_DEPTH
                )));
            }
        }

        let comment = self
            .comments
            .insert(NewComment {
                article_id: article.id,
                parent_id: dto.parent_id,
                user_id: author.user_id,
                content,
            })
            .await?;

        tracing::info!(
            "Comment created: id={}, article_id={}, parent_id={:?}, user_id={}",
            comment.id,
            comment.article_id,
            comment.parent_id,
            comment.user_id
        );

        Ok(comment.into())
    }

    /// Edit a comment's content; author only, and only before moderation
    pub async fn update(
        &self,
        id: i64,
        actor: &AuthenticatedUser,
        dto: UpdateCommentDto,
    ) -> Result<CommentResponseDto> {
        let comment = self.require_comment(id).await?;

        if comment.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "You can only edit your own comments".to_string(),
            ));
        }

        if !comment.status.is_author_mutable() {
            return Err(AppError::InvalidState(
                "Only pending comments can be edited".to_string(),
            ));
        }

        let content = validate_content(&dto.content)?;

        let updated = self
            .comments
            .update_content(id, &content)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))?;

        tracing::info!("Comment updated: id={}", id);

        Ok(updated.into())
    }

    /// Delete a comment together with every reply beneath it.
    ///
    /// Moderators may delete anything; authors only their own pending
    /// comments. Returns the number of removed comments.
    pub async fn delete(&self, id: i64, actor: &AuthenticatedUser) -> Result<u64> {
        let comment = self.require_comment(id).await?;

        let is_moderator = actor.has_moderator_access();
        if !is_moderator {
            if comment.user_id != actor.user_id {
                return Err(AppError::Forbidden(
                    "You can only delete your own comments".to_string(),
                ));
            }
            if !comment.status.is_author_mutable() {
                return Err(AppError::InvalidState(
                    "Only pending comments can be deleted".to_string(),
                ));
            }
        }

        let deleted = self.comments.delete_subtree(id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }

        tracing::info!(
            "Comment deleted: id={}, removed={}, by_user_id={}",
            id,
            deleted,
            actor.user_id
        );

        Ok(deleted)
    }

    /// Approve or reject a comment
    pub async fn set_status(&self, id: i64, action: ModerationAction) -> Result<CommentResponseDto> {
        let comment = self.require_comment(id).await?;
        let target = comment.status.apply(action)?;

        let updated = self
            .comments
            .update_status(id, target)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))?;

        tracing::info!("Comment {}: id={}", action.past_tense(), id);

        Ok(updated.into())
    }

    pub async fn stats(&self, article_id: Option<i64>) -> Result<CommentStatsDto> {
        Ok(self.comments.stats(article_id).await?.into())
    }
}
