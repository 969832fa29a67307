//! Threaded reader comments on news articles.
//!
//! Comments nest through `parent_id` and go through moderation before the
//! public can see them (see [`moderation`]).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/comments` | No | Approved comments, paginated |
//! | GET | `/api/comments/article/{article_id}` | Optional | Comment threads of an article |
//! | POST | `/api/comments` | Yes | Post a comment or reply |
//! | GET | `/api/comments/{id}` | Yes | Single comment |
//! | PUT | `/api/comments/{id}` | Yes (author) | Edit a pending comment |
//! | DELETE | `/api/comments/{id}` | Yes (author/moderator) | Delete with all replies |
//! | PATCH | `/api/comments/{id}/approve` | Moderator | Approve |
//! | PATCH | `/api/comments/{id}/reject` | Moderator | Reject |
//! | GET | `/api/admin/comments` | Moderator | Moderation queue |
//! | GET | `/api/admin/comments/stats` | Moderator | Counters per status |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod moderation;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgCommentRepository;
pub use services::CommentService;
