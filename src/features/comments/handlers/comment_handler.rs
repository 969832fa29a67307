use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::{MaybeUser, RequireModerator};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{
    AdminCommentQueryParams, CommentQueryParams, CommentResponseDto, CommentStatsDto,
    CommentStatsQueryParams, CommentTreeDto, CreateCommentDto, UpdateCommentDto,
};
use crate::features::comments::moderation::ModerationAction;
use crate::features::comments::services::CommentService;
use crate::shared::types::ApiResponse;

/// List approved comments (paginated)
#[utoipa::path(
    get,
    path = "/api/comments",
    params(CommentQueryParams),
    responses(
        (status = 200, description = "List of approved comments", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(service): State<Arc<CommentService>>,
    AppQuery(params): AppQuery<CommentQueryParams>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let (items, pagination) = service.list(params.into()).await?;
    Ok(Json(ApiResponse::success(Some(items), None, Some(pagination))))
}

/// Comment threads of an article
///
/// Anonymous and regular callers see approved comments only. A bearer token
/// with moderator rights reveals every status.
#[utoipa::path(
    get,
    path = "/api/comments/article/{article_id}",
    params(
        ("article_id" = i64, Path, description = "News article ID")
    ),
    responses(
        (status = 200, description = "Comment forest, oldest first", body = ApiResponse<Vec<CommentTreeDto>>),
        (status = 404, description = "Article not found")
    ),
    tag = "comments"
)]
pub async fn list_article_comments(
    MaybeUser(viewer): MaybeUser,
    State(service): State<Arc<CommentService>>,
    Path(article_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CommentTreeDto>>>> {
    let tree = service
        .list_for_article(article_id, viewer.as_ref())
        .await?;
    Ok(Json(ApiResponse::success(Some(tree), None, None)))
}

/// Post a comment or a reply
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment submitted for moderation", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Invalid content, parent on another article or nesting too deep"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Article or parent comment not found"),
        (status = 409, description = "Article unpublished or parent not approved")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    let comment = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(comment),
            Some("Comment submitted and awaiting moderation".to_string()),
            None,
        )),
    ))
}

/// Get a single comment
#[utoipa::path(
    get,
    path = "/api/comments/{id}",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment found", body = ApiResponse<CommentResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Comment not approved and caller is neither author nor moderator"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    let comment = service.get(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(comment), None, None)))
}

/// Edit own pending comment
#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Invalid content"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 409, description = "Comment already moderated")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    let comment = service.update(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(comment),
        Some("Comment updated successfully".to_string()),
        None,
    )))
}

/// Delete a comment and all of its replies
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author and not a moderator"),
        (status = 404, description = "Comment not found"),
        (status = 409, description = "Author cannot delete a moderated comment")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let removed = service.delete(id, &user).await?;
    let message = match removed {
        1 => "Comment deleted successfully".to_string(),
        n => format!("Comment and {} replies deleted successfully", n - 1),
    };
    Ok(Json(ApiResponse::success(None, Some(message), None)))
}

async fn moderate(
    service: &CommentService,
    id: i64,
    action: ModerationAction,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    let comment = service.set_status(id, action).await?;
    Ok(Json(ApiResponse::success(
        Some(comment),
        Some(format!("Comment {} successfully", action.past_tense())),
        None,
    )))
}

/// Approve a comment
#[utoipa::path(
    patch,
    path = "/api/comments/{id}/approve",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment approved", body = ApiResponse<CommentResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Moderator access required"),
        (status = 404, description = "Comment not found"),
        (status = 409, description = "Comment already approved")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn approve_comment(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    moderate(&service, id, ModerationAction::Approve).await
}

/// Reject a comment
#[utoipa::path(
    patch,
    path = "/api/comments/{id}/reject",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment rejected", body = ApiResponse<CommentResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Moderator access required"),
        (status = 404, description = "Comment not found"),
        (status = 409, description = "Comment already rejected")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reject_comment(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    moderate(&service, id, ModerationAction::Reject).await
}

/// Moderation queue: comments of any status (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/comments",
    params(AdminCommentQueryParams),
    responses(
        (status = 200, description = "List of comments", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Moderator access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_all_comments(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<CommentService>>,
    AppQuery(params): AppQuery<AdminCommentQueryParams>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let (items, pagination) = service.list(params.into()).await?;
    Ok(Json(ApiResponse::success(Some(items), None, Some(pagination))))
}

/// Comment counters per status
#[utoipa::path(
    get,
    path = "/api/admin/comments/stats",
    params(CommentStatsQueryParams),
    responses(
        (status = 200, description = "Comment statistics", body = ApiResponse<CommentStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Moderator access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn comment_stats(
    RequireModerator(_user): RequireModerator,
    State(service): State<Arc<CommentService>>,
    AppQuery(params): AppQuery<CommentStatsQueryParams>,
) -> Result<Json<ApiResponse<CommentStatsDto>>> {
    let stats = service.stats(params.article_id).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::features::articles::repositories::InMemoryArticleRepository;
    use crate::features::auth::model::Role;
    use crate::features::comments::moderation::CommentStatus;
    use crate::features::comments::repositories::InMemoryCommentRepository;
    use crate::features::comments::routes;
    use crate::shared::test_helpers::{test_user, with_user};

    use super::*;

    async fn setup() -> (Arc<CommentService>, Arc<InMemoryCommentRepository>) {
        let comments = Arc::new(InMemoryCommentRepository::new());
        let articles = Arc::new(InMemoryArticleRepository::new());
        articles.insert_published(1).await;
        let service = Arc::new(CommentService::new(comments.clone(), articles));
        (service, comments)
    }

    fn app(service: Arc<CommentService>) -> Router {
        Router::new()
            .merge(routes::public_routes(Arc::clone(&service)))
            .merge(routes::protected_routes(service))
    }

    #[tokio::test]
    async fn test_create_returns_pending_comment() {
        let (service, _) = setup().await;
        let server = TestServer::new(with_user(app(service), test_user(7, Role::User))).unwrap();

        let response = server
            .post("/api/comments")
            .json(&json!({ "article_id": 1, "content": "Well written", "status": "approved" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["user_id"], 7);
    }

    #[tokio::test]
    async fn test_error_envelope_carries_kind() {
        let (service, comments) = setup().await;
        let pending = comments.seed(1, None, 1, CommentStatus::Pending).await;
        let server = TestServer::new(with_user(app(service), test_user(7, Role::User))).unwrap();

        let response = server
            .post("/api/comments")
            .json(&json!({ "article_id": 1, "parent_id": pending.id, "content": "Reply" }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "invalid_state");
    }

    #[tokio::test]
    async fn test_moderation_requires_moderator() {
        let (service, comments) = setup().await;
        let comment = comments.seed(1, None, 1, CommentStatus::Pending).await;
        let path = format!("/api/comments/{}/approve", comment.id);

        let server =
            TestServer::new(with_user(app(service.clone()), test_user(1, Role::User))).unwrap();
        server.patch(&path).await.assert_status(StatusCode::FORBIDDEN);

        let server =
            TestServer::new(with_user(app(service), test_user(2, Role::Moderator))).unwrap();
        let response = server.patch(&path).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "approved");

        let again = server.patch(&path).await;
        again.assert_status(StatusCode::CONFLICT);
        let body: Value = again.json();
        assert_eq!(body["code"], "already_in_state");
    }

    #[tokio::test]
    async fn test_protected_routes_reject_anonymous_callers() {
        let (service, _) = setup().await;
        let server = TestServer::new(app(service)).unwrap();

        let response = server
            .post("/api/comments")
            .json(&json!({ "article_id": 1, "content": "Hello" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_article_threads_widen_for_moderators() {
        let (service, comments) = setup().await;
        let root = comments.seed(1, None, 1, CommentStatus::Approved).await;
        comments.seed(1, Some(root.id), 2, CommentStatus::Pending).await;

        let server = TestServer::new(app(service.clone())).unwrap();
        let body: Value = server.get("/api/comments/article/1").await.json();
        assert_eq!(body["data"][0]["replies"], json!([]));

        let server =
            TestServer::new(with_user(app(service), test_user(3, Role::Editor))).unwrap();
        let body: Value = server.get("/api/comments/article/1").await.json();
        assert_eq!(body["data"][0]["replies"][0]["status"], "pending");
    }

    #[tokio::test]
    async fn test_public_listing_is_paginated() {
        let (service, comments) = setup().await;
        for _ in 0..3 {
            comments.seed(1, None, 1, CommentStatus::Approved).await;
        }

        let server = TestServer::new(app(service)).unwrap();
        let response = server
            .get("/api/comments")
            .add_query_param("article_id", 1)
            .add_query_param("limit", 2)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["total_pages"], 2);
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let (service, comments) = setup().await;
        comments.seed(1, None, 1, CommentStatus::Approved).await;

        let server = TestServer::new(app(service)).unwrap();
        let response = server
            .get("/api/comments")
            .add_query_param("page", 100_000_000_000_000_000i64)
            .add_query_param("limit", 100)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_hidden_comment_is_forbidden_to_strangers() {
        let (service, comments) = setup().await;
        let pending = comments.seed(1, None, 1, CommentStatus::Pending).await;

        let server = TestServer::new(with_user(app(service), test_user(2, Role::User))).unwrap();
        let response = server.get(&format!("/api/comments/{}", pending.id)).await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["code"], "forbidden");
    }

    #[tokio::test]
    async fn test_delete_cascades_through_http() {
        let (service, comments) = setup().await;
        let root = comments.seed(1, None, 1, CommentStatus::Approved).await;
        comments.seed(1, Some(root.id), 2, CommentStatus::Approved).await;

        let server =
            TestServer::new(with_user(app(service), test_user(9, Role::Moderator))).unwrap();
        let response = server.delete(&format!("/api/comments/{}", root.id)).await;

        response.assert_status_ok();
        assert_eq!(comments.row_count().await, 0);
    }
}
