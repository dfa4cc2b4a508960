use std::sync::Arc;

use axum::{extract::State, Json};

use crate::features::stats::dtos::{
    ConnectionsResponseDto, DatabaseStatsResponseDto, SlowQueriesResponseDto,
};
use crate::features::stats::services::StatsService;
use crate::shared::types::ApiResponse;

/// Database size, largest tables and row estimates
#[utoipa::path(
    get,
    path = "/v1/stats/db",
    responses(
        (status = 200, description = "Database snapshot, or an `error` when unavailable", body = ApiResponse<DatabaseStatsResponseDto>)
    ),
    tag = "stats"
)]
pub async fn database_stats(
    State(service): State<Arc<StatsService>>,
) -> Json<ApiResponse<DatabaseStatsResponseDto>> {
    Json(ApiResponse::success(Some(service.database().await), None, None))
}

/// Slowest statement shapes by mean execution time
///
/// Requires the `pg_stat_statements` extension; without it the list is
/// empty and a `warning` explains why.
#[utoipa::path(
    get,
    path = "/v1/stats/queries",
    responses(
        (status = 200, description = "Slow query ranking", body = ApiResponse<SlowQueriesResponseDto>)
    ),
    tag = "stats"
)]
pub async fn slow_queries(
    State(service): State<Arc<StatsService>>,
) -> Json<ApiResponse<SlowQueriesResponseDto>> {
    Json(ApiResponse::success(
        Some(service.slow_queries().await),
        None,
        None,
    ))
}

#[utoipa::path(
    get,
    path = "/v1/stats/connections",
    responses(
        (status = 200, description = "Connected backends and counts per state", body = ApiResponse<ConnectionsResponseDto>)
    ),
    tag = "stats"
)]
pub async fn connections(
    State(service): State<Arc<StatsService>>,
) -> Json<ApiResponse<ConnectionsResponseDto>> {
    Json(ApiResponse::success(
        Some(service.connections().await),
        None,
        None,
    ))
}
