//! Read-only view of articles.
//!
//! Articles are authored elsewhere; comments only need to know whether an
//! article exists and is published.

pub mod models;
pub mod repositories;

pub use repositories::{ArticleRepository, PgArticleRepository};
