use async_trait::async_trait;
use sqlx::PgPool;

use crate::features::stats::dtos::{
    ConnectionDto, ConnectionStateCountDto, DatabaseSummaryDto, RowCountDto, SlowQueryDto,
    TableSizeDto,
};
use crate::shared::constants::STATS_QUERY_PREVIEW_CHARS;

/// Engine-specific catalog queries behind the diagnostics endpoints
#[async_trait]
pub trait DatabaseIntrospector: Send + Sync {
    async fn database_summary(&self) -> Result<DatabaseSummaryDto, sqlx::Error>;

    /// Largest tables of the public schema, biggest first
    async fn table_sizes(&self, limit: i64) -> Result<Vec<TableSizeDto>, sqlx::Error>;

    async fn row_counts(&self) -> Result<Vec<RowCountDto>, sqlx::Error>;

    /// Whether per-statement execution statistics are being collected
    async fn statement_stats_enabled(&self) -> Result<bool, sqlx::Error>;

    /// Statement shapes with the highest mean execution time
    async fn slow_queries(&self, limit: i64) -> Result<Vec<SlowQueryDto>, sqlx::Error>;

    /// Other backends connected to the current database, latest query first
    async fn connections(&self) -> Result<Vec<ConnectionDto>, sqlx::Error>;

    async fn connection_states(&self) -> Result<Vec<ConnectionStateCountDto>, sqlx::Error>;
}

/// Introspection through the PostgreSQL statistics views
pub struct PostgresIntrospector {
    pool: PgPool,
}

impl PostgresIntrospector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseIntrospector for PostgresIntrospector {
    async fn database_summary(&self) -> Result<DatabaseSummaryDto, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                pg_size_pretty(pg_database_size(current_database())) AS size,
                (SELECT COUNT(*) FROM pg_stat_activity WHERE state = 'active') AS active_connections,
                (SELECT COUNT(*) FROM pg_stat_activity) AS total_connections
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn table_sizes(&self, limit: i64) -> Result<Vec<TableSizeDto>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                schemaname::text AS schemaname,
                tablename::text AS tablename,
                pg_size_pretty(pg_total_relation_size(format('%I.%I', schemaname, tablename)::regclass)) AS size,
                pg_total_relation_size(format('%I.%I', schemaname, tablename)::regclass) AS bytes
            FROM pg_tables
            WHERE schemaname = 'public'
            ORDER BY bytes DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn row_counts(&self) -> Result<Vec<RowCountDto>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                schemaname::text AS schemaname,
                relname::text AS tablename,
                n_live_tup AS row_count
            FROM pg_stat_user_tables
            WHERE schemaname = 'public'
            ORDER BY n_live_tup DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn statement_stats_enabled(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pg_extension WHERE extname = 'pg_stat_statements')",
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn slow_queries(&self, limit: i64) -> Result<Vec<SlowQueryDto>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                substring(query, 1, $1) AS query_preview,
                calls,
                round(total_exec_time::numeric, 2) AS total_time_ms,
                round(mean_exec_time::numeric, 2) AS avg_time_ms,
                round(max_exec_time::numeric, 2) AS max_time_ms,
                rows
            FROM pg_stat_statements
            WHERE query NOT LIKE '%pg_stat_statements%'
            ORDER BY mean_exec_time DESC
            LIMIT $2
            "#,
        )
        .bind(STATS_QUERY_PREVIEW_CHARS)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn connections(&self) -> Result<Vec<ConnectionDto>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                pid,
                usename::text AS usename,
                application_name,
                host(client_addr) AS client_addr,
                state,
                query_start,
                state_change,
                substring(query, 1, $1) AS current_query
            FROM pg_stat_activity
            WHERE datname = current_database()
              AND pid <> pg_backend_pid()
            ORDER BY query_start DESC NULLS LAST
            "#,
        )
        .bind(STATS_QUERY_PREVIEW_CHARS)
        .fetch_all(&self.pool)
        .await
    }

    async fn connection_states(&self) -> Result<Vec<ConnectionStateCountDto>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT state, COUNT(*) AS count
            FROM pg_stat_activity
            WHERE datname = current_database()
            GROUP BY state
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
