use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Already in state: {0}")]
    AlreadyInState(String),

    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    #[error("Circular reference: {0}")]
    CircularReference(String),

    #[error("Category has children: {0}")]
    HasChildren(String),

    #[error("Category has articles: {0}")]
    HasArticles(String),
}

impl AppError {
    /// Stable, machine-readable error kind returned as `code` in the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "invalid_input",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidState(_) => "invalid_state",
            AppError::AlreadyInState(_) => "already_in_state",
            AppError::DuplicateSlug(_) => "duplicate_slug",
            AppError::CircularReference(_) => "circular_reference",
            AppError::HasChildren(_) => "has_children",
            AppError::HasArticles(_) => "has_articles",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::CircularReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidState(_)
            | AppError::AlreadyInState(_)
            | AppError::DuplicateSlug(_)
            | AppError::HasChildren(_)
            | AppError::HasArticles(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let (message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error occurred".to_string(), None)
            }
            AppError::Validation(ref msg) => (msg.clone(), Some(vec![msg.clone()])),
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::InvalidState(msg)
            | AppError::AlreadyInState(msg)
            | AppError::DuplicateSlug(msg)
            | AppError::CircularReference(msg)
            | AppError::HasChildren(msg)
            | AppError::HasArticles(msg) => (msg, None),
        };

        let body = Json(ApiResponse::<()>::error(
            Some(message),
            Some(code.to_string()),
            errors,
        ));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
