use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Read-only routes, no authentication required
pub fn public_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/categories/{id}", get(handlers::get_category))
        .route(
            "/api/categories/{id}/children",
            get(handlers::get_category_children),
        )
        .with_state(service)
}

/// Category management, editor role and above
pub fn protected_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", post(handlers::create_category))
        .route("/api/categories/reorder", post(handlers::reorder_categories))
        .route(
            "/api/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/api/categories/{id}/deactivate",
            patch(handlers::deactivate_category),
        )
        .with_state(service)
}
