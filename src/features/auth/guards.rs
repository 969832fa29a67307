//! Role-based authorization guards for the application.
//!
//! These guards extract the authenticated user and verify they have the required roles.
//!
//! Role hierarchy (from highest to lowest):
//! - super_admin: everything
//! - editor: manages categories, moderates comments
//! - moderator: approves, rejects and deletes comments
//! - user: writes and edits their own pending comments
//!
//! Each higher role includes all permissions of lower roles.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// Guard for comment moderation.
///
/// Allows users with "moderator", "editor" or "super_admin" roles.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireModerator(user): RequireModerator) { ... }
/// ```
pub struct RequireModerator(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireModerator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        if !user.has_moderator_access() {
            return Err(AppError::Forbidden(
                "Access denied. Insufficient permissions.".to_string(),
            ));
        }

        Ok(RequireModerator(user.clone()))
    }
}

/// Guard for category management.
///
/// Allows users with "editor" or "super_admin" roles.
pub struct RequireEditor(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        if !user.has_editor_access() {
            return Err(AppError::Forbidden(
                "Access denied. Insufficient permissions.".to_string(),
            ));
        }

        Ok(RequireEditor(user.clone()))
    }
}

/// The caller, if the optional auth middleware resolved one.
///
/// Never rejects; public endpoints use it to widen what privileged viewers see.
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Any authenticated caller.
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
