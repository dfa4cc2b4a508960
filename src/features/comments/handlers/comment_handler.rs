use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::comments::dtos::{CommentResponseDto, CreateCommentDto, UpdateCommentDto};
use crate::features::comments::services::CommentService;
use crate::shared::types::ApiResponse;

/// List comments on a file, newest first
#[utoipa::path(
    get,
    path = "/v1/files/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Comments with their authors", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 404, description = "File not found")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(service): State<Arc<CommentService>>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let comments = service.list_for_file(file_id).await?;
    Ok(Json(ApiResponse::success(Some(comments), None, None)))
}

/// Comment on a file
#[utoipa::path(
    post,
    path = "/v1/files/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<CommentResponseDto>),
        (status = 404, description = "File not found"),
        (status = 422, description = "Validation error or unknown author")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(service): State<Arc<CommentService>>,
    Path(file_id): Path<Uuid>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    dto.validate()?;

    let comment = service.create(file_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(comment), None, None)),
    ))
}

/// Edit a comment's content
#[utoipa::path(
    put,
    path = "/v1/comments/{id}",
    params(
        ("id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentResponseDto>),
        (status = 404, description = "Comment not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "comments"
)]
pub async fn update_comment(
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    dto.validate()?;

    let comment = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(comment), None, None)))
}

#[utoipa::path(
    delete,
    path = "/v1/comments/{id}",
    params(
        ("id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Comment deleted".to_string()),
        None,
    )))
}
