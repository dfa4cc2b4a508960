use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery, ClientMeta};
use crate::features::files::dtos::{
    CreateFileDto, FileDetailDto, FileListItemDto, FileQueryParams, FileWithRelationsDto,
    UpdateFileDto, ViewFileDto, ViewFileResponseDto,
};
use crate::features::files::services::FileService;
use crate::shared::constants::DEFAULT_FILE_PAGE_SIZE;
use crate::shared::types::{ApiResponse, Meta};

/// List files
///
/// Filters combine with AND; results embed a compact owner and organization.
#[utoipa::path(
    get,
    path = "/v1/files",
    params(FileQueryParams),
    responses(
        (status = 200, description = "List of files", body = ApiResponse<Vec<FileListItemDto>>),
        (status = 422, description = "Invalid filter, sort or pagination parameter")
    ),
    tag = "files"
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
    AppQuery(params): AppQuery<FileQueryParams>,
) -> Result<Json<ApiResponse<Vec<FileListItemDto>>>> {
    let (items, total) = service.list(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::new(total, &params.pagination(), DEFAULT_FILE_PAGE_SIZE)),
    )))
}

/// List files owned by a user
#[utoipa::path(
    get,
    path = "/v1/users/{id}/files",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        FileQueryParams
    ),
    responses(
        (status = 200, description = "Files owned by the user", body = ApiResponse<Vec<FileListItemDto>>),
        (status = 404, description = "User not found"),
        (status = 422, description = "Invalid filter, sort or pagination parameter")
    ),
    tag = "files"
)]
pub async fn list_user_files(
    State(service): State<Arc<FileService>>,
    Path(user_id): Path<Uuid>,
    AppQuery(params): AppQuery<FileQueryParams>,
) -> Result<Json<ApiResponse<Vec<FileListItemDto>>>> {
    let page = params.pagination();
    let (items, total) = service.list_for_user(user_id, params).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::new(total, &page, DEFAULT_FILE_PAGE_SIZE)),
    )))
}

/// Create a file
///
/// The file and its `created` activity entry are written atomically.
#[utoipa::path(
    post,
    path = "/v1/files",
    request_body = CreateFileDto,
    responses(
        (status = 201, description = "File created", body = ApiResponse<FileWithRelationsDto>),
        (status = 422, description = "Validation error or unknown owner/organization")
    ),
    tag = "files"
)]
pub async fn create_file(
    State(service): State<Arc<FileService>>,
    client: ClientMeta,
    AppJson(dto): AppJson<CreateFileDto>,
) -> Result<(StatusCode, Json<ApiResponse<FileWithRelationsDto>>)> {
    dto.validate()?;

    let file = service.create(dto, client).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(file), None, None)),
    ))
}

/// Get a file with its owner, organization and comments
#[utoipa::path(
    get,
    path = "/v1/files/{id}",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File found", body = ApiResponse<FileDetailDto>),
        (status = 404, description = "File not found")
    ),
    tag = "files"
)]
pub async fn get_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileDetailDto>>> {
    let file = service.get_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(file), None, None)))
}

/// Edit a file
///
/// Bumps `version` by one, refreshes `last_modified` and records an
/// `edited` activity entry in the same transaction.
#[utoipa::path(
    put,
    path = "/v1/files/{id}",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body = UpdateFileDto,
    responses(
        (status = 200, description = "File updated", body = ApiResponse<FileWithRelationsDto>),
        (status = 404, description = "File not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "files"
)]
pub async fn update_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
    client: ClientMeta,
    AppJson(dto): AppJson<UpdateFileDto>,
) -> Result<Json<ApiResponse<FileWithRelationsDto>>> {
    dto.validate()?;

    let file = service.update(id, dto, client).await?;
    Ok(Json(ApiResponse::success(Some(file), None, None)))
}

#[utoipa::path(
    delete,
    path = "/v1/files/{id}",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted"),
        (status = 404, description = "File not found")
    ),
    tag = "files"
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("File deleted".to_string()),
        None,
    )))
}

/// Count a view of a file
///
/// The JSON body is optional. Views of a missing file are acknowledged
/// with `ignored: true` and leave no trace.
#[utoipa::path(
    post,
    path = "/v1/files/{id}/view",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body(content = ViewFileDto, description = "Optional viewer"),
    responses(
        (status = 200, description = "View counted or ignored", body = ApiResponse<ViewFileResponseDto>)
    ),
    tag = "files"
)]
pub async fn view_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
    client: ClientMeta,
    body: Option<AppJson<ViewFileDto>>,
) -> Result<Json<ApiResponse<ViewFileResponseDto>>> {
    let viewer = body.and_then(|AppJson(dto)| dto.user_id);

    let outcome = service.increment_view(id, viewer, client).await?;
    Ok(Json(ApiResponse::success(Some(outcome), None, None)))
}
