use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::organizations::dtos::{
    CreateOrganizationDto, OrganizationResponseDto, UpdateOrganizationDto,
};
use crate::features::organizations::services::OrganizationService;
use crate::shared::constants::DEFAULT_ORGANIZATION_PAGE_SIZE;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List organizations (paginated, newest first)
#[utoipa::path(
    get,
    path = "/v1/organizations",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of organizations", body = ApiResponse<Vec<OrganizationResponseDto>>),
        (status = 422, description = "Invalid pagination parameters")
    ),
    tag = "organizations"
)]
pub async fn list_organizations(
    State(service): State<Arc<OrganizationService>>,
    AppQuery(page): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<OrganizationResponseDto>>>> {
    let (items, total) = service.list(&page).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::new(total, &page, DEFAULT_ORGANIZATION_PAGE_SIZE)),
    )))
}

/// Create an organization
#[utoipa::path(
    post,
    path = "/v1/organizations",
    request_body = CreateOrganizationDto,
    responses(
        (status = 201, description = "Organization created", body = ApiResponse<OrganizationResponseDto>),
        (status = 422, description = "Validation error")
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(service): State<Arc<OrganizationService>>,
    AppJson(dto): AppJson<CreateOrganizationDto>,
) -> Result<(StatusCode, Json<ApiResponse<OrganizationResponseDto>>)> {
    dto.validate()?;

    let organization = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(organization), None, None)),
    ))
}

/// Get an organization by ID
#[utoipa::path(
    get,
    path = "/v1/organizations/{id}",
    params(
        ("id" = Uuid, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization found", body = ApiResponse<OrganizationResponseDto>),
        (status = 404, description = "Organization not found")
    ),
    tag = "organizations"
)]
pub async fn get_organization(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrganizationResponseDto>>> {
    let organization = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(organization), None, None)))
}

/// Partially update an organization
#[utoipa::path(
    put,
    path = "/v1/organizations/{id}",
    params(
        ("id" = Uuid, Path, description = "Organization ID")
    ),
    request_body = UpdateOrganizationDto,
    responses(
        (status = 200, description = "Organization updated", body = ApiResponse<OrganizationResponseDto>),
        (status = 404, description = "Organization not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "organizations"
)]
pub async fn update_organization(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateOrganizationDto>,
) -> Result<Json<ApiResponse<OrganizationResponseDto>>> {
    dto.validate()?;

    let organization = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(organization), None, None)))
}

/// Delete an organization
///
/// Refused with 409 while users or files still belong to it.
#[utoipa::path(
    delete,
    path = "/v1/organizations/{id}",
    params(
        ("id" = Uuid, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization deleted"),
        (status = 404, description = "Organization not found"),
        (status = 409, description = "Organization still has users or files")
    ),
    tag = "organizations"
)]
pub async fn delete_organization(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Organization deleted".to_string()),
        None,
    )))
}
