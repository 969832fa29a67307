use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Read-only routes, served with optional authentication
pub fn public_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route("/api/comments", get(handlers::list_comments))
        .route(
            "/api/comments/article/{article_id}",
            get(handlers::list_article_comments),
        )
        .with_state(service)
}

/// Routes that require a bearer token
pub fn protected_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route("/api/comments", post(handlers::create_comment))
        .route(
            "/api/comments/{id}",
            get(handlers::get_comment)
                .put(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
        .route("/api/comments/{id}/approve", patch(handlers::approve_comment))
        .route("/api/comments/{id}/reject", patch(handlers::reject_comment))
        .route("/api/admin/comments", get(handlers::list_all_comments))
        .route("/api/admin/comments/stats", get(handlers::comment_stats))
        .with_state(service)
}
