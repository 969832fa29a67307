use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::model::Role;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::comments::{
    dtos as comments_dtos, handlers as comments_handlers, moderation::CommentStatus,
};
use crate::shared::types::{ApiResponse, Pagination, SortDirection};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Comments (public reads)
        comments_handlers::list_comments,
        comments_handlers::list_article_comments,
        // Comments (authenticated)
        comments_handlers::create_comment,
        comments_handlers::get_comment,
        comments_handlers::update_comment,
        comments_handlers::delete_comment,
        // Comment moderation
        comments_handlers::approve_comment,
        comments_handlers::reject_comment,
        comments_handlers::list_all_comments,
        comments_handlers::comment_stats,
        // Categories (public reads)
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::get_category_children,
        // Categories (editor)
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::deactivate_category,
        categories_handlers::reorder_categories,
        categories_handlers::delete_category,
    ),
    components(
        schemas(
            Pagination,
            SortDirection,
            Role,
            // Comments
            CommentStatus,
            comments_dtos::CreateCommentDto,
            comments_dtos::UpdateCommentDto,
            comments_dtos::CommentResponseDto,
            comments_dtos::CommentTreeDto,
            comments_dtos::CommentStatsDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            ApiResponse<Vec<comments_dtos::CommentTreeDto>>,
            ApiResponse<comments_dtos::CommentStatsDto>,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryOrderDto,
            categories_dtos::ReorderCategoriesDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryDetailDto,
            categories_dtos::CategoryListingDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryDetailDto>,
            ApiResponse<categories_dtos::CategoryListingDto>,
        )
    ),
    tags(
        (name = "comments", description = "Threaded reader comments on news articles"),
        (name = "categories", description = "News category hierarchy"),
        (name = "admin", description = "Comment moderation queue (moderator and above)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Newsroom API",
        version = "0.1.0",
        description = "Comment and category trees of the newsroom backend",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/comments",
            "/api/comments/article/{article_id}",
            "/api/comments/{id}",
            "/api/comments/{id}/approve",
            "/api/admin/comments/stats",
            "/api/categories/{id}/children",
            "/api/categories/reorder",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "Described".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
