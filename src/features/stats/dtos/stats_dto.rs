use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// =============================================================================
// ENGINE SNAPSHOTS
// =============================================================================

/// Size and connection counts of the current database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DatabaseSummaryDto {
    /// Human readable, e.g. "8329 kB"
    pub size: String,
    pub active_connections: i64,
    pub total_connections: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TableSizeDto {
    pub schemaname: String,
    pub tablename: String,
    /// Human readable total size including indexes and TOAST
    pub size: String,
    pub bytes: i64,
}

/// Live-tuple estimate from the statistics collector
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RowCountDto {
    pub schemaname: String,
    pub tablename: String,
    pub row_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SlowQueryDto {
    pub query_preview: Option<String>,
    pub calls: i64,
    #[schema(value_type = String, example = "1532.40")]
    pub total_time_ms: Decimal,
    #[schema(value_type = String, example = "12.75")]
    pub avg_time_ms: Decimal,
    #[schema(value_type = String, example = "310.02")]
    pub max_time_ms: Decimal,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ConnectionDto {
    pub pid: i32,
    pub usename: Option<String>,
    pub application_name: Option<String>,
    pub client_addr: Option<String>,
    pub state: Option<String>,
    pub query_start: Option<DateTime<Utc>>,
    pub state_change: Option<DateTime<Utc>>,
    pub current_query: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ConnectionStateCountDto {
    /// `None` for background processes without a client state
    pub state: Option<String>,
    pub count: i64,
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatabaseStatsResponseDto {
    pub database: Option<DatabaseSummaryDto>,
    pub table_sizes: Vec<TableSizeDto>,
    pub row_counts: Vec<RowCountDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlowQueriesResponseDto {
    pub slow_queries: Vec<SlowQueryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectionsResponseDto {
    pub connections: Vec<ConnectionDto>,
    pub stats: Vec<ConnectionStateCountDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}
