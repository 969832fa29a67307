use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_EDITOR, ROLE_MODERATOR, ROLE_SUPER_ADMIN, ROLE_USER};

/// Capability tiers, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Moderator,
    Editor,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Moderator => ROLE_MODERATOR,
            Role::Editor => ROLE_EDITOR,
            Role::SuperAdmin => ROLE_SUPER_ADMIN,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Check if user can moderate comments (moderator, editor, super_admin)
    pub fn has_moderator_access(&self) -> bool {
        self.role >= Role::Moderator
    }

    /// Check if user can manage categories (editor, super_admin)
    pub fn has_editor_access(&self) -> bool {
        self.role >= Role::Editor
    }
}

/// Claims carried by the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub role: Role,
    pub exp: u64,
}
