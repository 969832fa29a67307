//! News categories arranged in a tree.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | Flat list (`parent_id`, `is_active`) or `tree=true` |
//! | GET | `/api/categories/{id}` | No | By ID or slug, with direct children |
//! | GET | `/api/categories/{id}/children` | No | Direct children |
//! | POST | `/api/categories` | Editor | Create |
//! | PUT | `/api/categories/{id}` | Editor | Update, including reparenting |
//! | PATCH | `/api/categories/{id}/deactivate` | Editor | Soft delete |
//! | POST | `/api/categories/reorder` | Editor | Batch `display_order` update |
//! | DELETE | `/api/categories/{id}` | Editor | Hard delete (childless, no articles) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgCategoryRepository;
pub use services::CategoryService;
