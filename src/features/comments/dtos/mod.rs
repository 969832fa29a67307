pub mod comment_dto;

pub use comment_dto::{
    AdminCommentQueryParams, CommentQueryParams, CommentResponseDto, CommentStatsDto,
    CommentStatsQueryParams, CommentTreeDto, CreateCommentDto, UpdateCommentDto,
};
