use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::comments::dtos::CommentResponseDto;
use crate::features::files::models::{File, FileListRow};
use crate::features::organizations::dtos::{OrganizationResponseDto, OrganizationSummaryDto};
use crate::features::users::dtos::{UserResponseDto, UserSummaryDto};
use crate::shared::types::{PaginationQuery, SortDirection};
use crate::shared::validation::{validate_json_object, validate_not_blank};

// =============================================================================
// QUERY DTOs
// =============================================================================

/// Query params for listing files
///
/// Unknown `sort_by` / `sort_order` values are rejected.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FileQueryParams {
    /// Page number (1-indexed, default: 1)
    #[param(minimum = 1)]
    pub page: Option<i64>,

    /// Number of items per page (default: 20, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub per_page: Option<i64>,

    pub owner_id: Option<Uuid>,

    pub organization_id: Option<Uuid>,

    /// Case-insensitive substring match on the file name
    pub search: Option<String>,

    /// Sort column (default: last_modified)
    #[serde(default)]
    #[param(inline)]
    pub sort_by: FileSortBy,

    /// Sort direction (default: desc)
    #[serde(default)]
    #[param(inline)]
    pub sort_order: SortDirection,
}

impl FileQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// LIKE pattern for `search` taken verbatim, or `None` for a blank term
    pub fn search_pattern(&self) -> Option<String> {
        let term = self
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())?;
        Some(format!("%{}%", escape_like(term)))
    }
}

/// Escape LIKE metacharacters so user input matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Sort fields for files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileSortBy {
    Name,
    CreatedAt,
    UpdatedAt,
    #[default]
    LastModified,
    ViewCount,
    Version,
}

impl FileSortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            FileSortBy::Name => "f.name",
            FileSortBy::CreatedAt => "f.created_at",
            FileSortBy::UpdatedAt => "f.updated_at",
            FileSortBy::LastModified => "f.last_modified",
            FileSortBy::ViewCount => "f.view_count",
            FileSortBy::Version => "f.version",
        }
    }
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Request DTO for creating a file
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFileDto {
    #[serde(default)]
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 500, message = "may not be greater than 500 characters")
    )]
    #[schema(example = "Checkout flow v2")]
    pub name: String,

    /// Owning user; must exist
    #[validate(required(message = "is required"))]
    pub owner_id: Option<Uuid>,

    /// Owning organization; must exist
    #[validate(required(message = "is required"))]
    pub organization_id: Option<Uuid>,

    /// Defaults to false
    pub is_public: Option<bool>,

    #[validate(custom(function = "validate_json_object"))]
    pub metadata: Option<serde_json::Value>,
}

/// Request DTO for editing a file; every accepted edit bumps the version
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFileDto {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 500, message = "may not be greater than 500 characters")
    )]
    pub name: Option<String>,

    pub is_public: Option<bool>,

    #[validate(custom(function = "validate_json_object"))]
    pub metadata: Option<serde_json::Value>,
}

/// Optional body of a view ping
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ViewFileDto {
    /// Viewer; recorded on the activity log when it matches a user
    pub user_id: Option<Uuid>,
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

/// File row in listings, with compact owner and organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileListItemDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub organization_id: Uuid,
    pub version: i32,
    pub is_public: bool,
    pub view_count: i64,
    pub last_modified: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: UserSummaryDto,
    pub organization: OrganizationSummaryDto,
}

impl From<FileListRow> for FileListItemDto {
    fn from(row: FileListRow) -> Self {
        let f = row.file;
        Self {
            owner: UserSummaryDto {
                id: f.owner_id,
                name: row.owner_name,
                email: row.owner_email,
            },
            organization: OrganizationSummaryDto {
                id: f.organization_id,
                name: row.organization_name,
            },
            id: f.id,
            name: f.name,
            owner_id: f.owner_id,
            organization_id: f.organization_id,
            version: f.version,
            is_public: f.is_public,
            view_count: f.view_count,
            last_modified: f.last_modified,
            metadata: f.metadata,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

/// File returned from create and update, with full owner and organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileWithRelationsDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub organization_id: Uuid,
    pub version: i32,
    pub is_public: bool,
    pub view_count: i64,
    pub last_modified: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: UserResponseDto,
    pub organization: OrganizationResponseDto,
}

impl FileWithRelationsDto {
    pub fn new(f: File, owner: UserResponseDto, organization: OrganizationResponseDto) -> Self {
        Self {
            id: f.id,
            name: f.name,
            owner_id: f.owner_id,
            organization_id: f.organization_id,
            version: f.version,
            is_public: f.is_public,
            view_count: f.view_count,
            last_modified: f.last_modified,
            metadata: f.metadata,
            created_at: f.created_at,
            updated_at: f.updated_at,
            owner,
            organization,
        }
    }
}

/// Single file with owner, organization and comments (newest first)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileDetailDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub organization_id: Uuid,
    pub version: i32,
    pub is_public: bool,
    pub view_count: i64,
    pub last_modified: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: UserResponseDto,
    pub organization: OrganizationResponseDto,
    pub comments: Vec<CommentResponseDto>,
}

impl FileDetailDto {
    pub fn new(file: FileWithRelationsDto, comments: Vec<CommentResponseDto>) -> Self {
        Self {
            id: file.id,
            name: file.name,
            owner_id: file.owner_id,
            organization_id: file.organization_id,
            version: file.version,
            is_public: file.is_public,
            view_count: file.view_count,
            last_modified: file.last_modified,
            metadata: file.metadata,
            created_at: file.created_at,
            updated_at: file.updated_at,
            owner: file.owner,
            organization: file.organization,
            comments,
        }
    }
}

/// Outcome of a view ping; `ignored` when the file does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ViewFileResponseDto {
    pub ignored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
}

impl ViewFileResponseDto {
    pub fn ignored() -> Self {
        Self {
            ignored: true,
            view_count: None,
        }
    }

    pub fn counted(view_count: i64) -> Self {
        Self {
            ignored: false,
            view_count: Some(view_count),
        }
    }
}
