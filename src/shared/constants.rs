/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Minimum comment length, counted after trimming surrounding whitespace
pub const MIN_COMMENT_LENGTH: usize = 3;

/// Deepest level a comment thread or the category tree may reach; roots are level 1
pub const MAX_TREE_DEPTH: usize = 100;

/// Slugs that collide with static category routes
pub const RESERVED_CATEGORY_SLUGS: &[&str] = &["reorder"];

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

pub const ROLE_USER: &str = "user";

/// Moderator role - can approve, reject and delete any comment
pub const ROLE_MODERATOR: &str = "moderator";

/// Editor role - moderator rights plus category management
pub const ROLE_EDITOR: &str = "editor";

/// Super admin role - everything
pub const ROLE_SUPER_ADMIN: &str = "super_admin";
