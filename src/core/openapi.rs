use utoipa::{Modify, OpenApi};

use crate::features::comments::{dtos as comments_dtos, handlers as comments_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::organizations::{
    dtos as organizations_dtos, handlers as organizations_handlers,
};
use crate::features::stats::{dtos as stats_dtos, handlers as stats_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta, SortDirection};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Organizations
        organizations_handlers::list_organizations,
        organizations_handlers::create_organization,
        organizations_handlers::get_organization,
        organizations_handlers::update_organization,
        organizations_handlers::delete_organization,
        // Users
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::get_user,
        users_handlers::update_user,
        users_handlers::delete_user,
        // Files
        files_handlers::list_files,
        files_handlers::list_user_files,
        files_handlers::create_file,
        files_handlers::get_file,
        files_handlers::update_file,
        files_handlers::delete_file,
        files_handlers::view_file,
        // Comments
        comments_handlers::list_comments,
        comments_handlers::create_comment,
        comments_handlers::update_comment,
        comments_handlers::delete_comment,
        // Stats
        stats_handlers::database_stats,
        stats_handlers::slow_queries,
        stats_handlers::connections,
    ),
    components(
        schemas(
            // Shared
            Meta,
            SortDirection,
            // Organizations
            organizations_dtos::CreateOrganizationDto,
            organizations_dtos::UpdateOrganizationDto,
            organizations_dtos::OrganizationResponseDto,
            organizations_dtos::OrganizationSummaryDto,
            ApiResponse<organizations_dtos::OrganizationResponseDto>,
            ApiResponse<Vec<organizations_dtos::OrganizationResponseDto>>,
            // Users
            users_dtos::CreateUserDto,
            users_dtos::UpdateUserDto,
            users_dtos::UserResponseDto,
            users_dtos::UserSummaryDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Files
            files_dtos::FileSortBy,
            files_dtos::CreateFileDto,
            files_dtos::UpdateFileDto,
            files_dtos::ViewFileDto,
            files_dtos::FileListItemDto,
            files_dtos::FileWithRelationsDto,
            files_dtos::FileDetailDto,
            files_dtos::ViewFileResponseDto,
            ApiResponse<Vec<files_dtos::FileListItemDto>>,
            ApiResponse<files_dtos::FileWithRelationsDto>,
            ApiResponse<files_dtos::FileDetailDto>,
            ApiResponse<files_dtos::ViewFileResponseDto>,
            // Comments
            comments_dtos::CreateCommentDto,
            comments_dtos::UpdateCommentDto,
            comments_dtos::CommentResponseDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            // Stats
            stats_dtos::DatabaseSummaryDto,
            stats_dtos::TableSizeDto,
            stats_dtos::RowCountDto,
            stats_dtos::SlowQueryDto,
            stats_dtos::ConnectionDto,
            stats_dtos::ConnectionStateCountDto,
            stats_dtos::DatabaseStatsResponseDto,
            stats_dtos::SlowQueriesResponseDto,
            stats_dtos::ConnectionsResponseDto,
            ApiResponse<stats_dtos::DatabaseStatsResponseDto>,
            ApiResponse<stats_dtos::SlowQueriesResponseDto>,
            ApiResponse<stats_dtos::ConnectionsResponseDto>,
        )
    ),
    tags(
        (name = "organizations", description = "Tenants that group users and files"),
        (name = "users", description = "Organization members and file owners"),
        (name = "files", description = "Design files, versioning and view counting"),
        (name = "comments", description = "Comments pinned on design files"),
        (name = "stats", description = "Read-only PostgreSQL diagnostics"),
    ),
    info(
        title = "DesignHub API",
        version = "0.1.0",
        description = "API documentation for DesignHub",
    )
)]
pub struct ApiDoc;

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
