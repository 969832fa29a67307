pub mod comment;

pub use comment::{Comment, CommentFilter, CommentStats, NewComment};
