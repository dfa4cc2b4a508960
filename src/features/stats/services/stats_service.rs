use std::sync::Arc;

use chrono::Utc;

use crate::features::stats::dtos::{
    ConnectionsResponseDto, DatabaseStatsResponseDto, SlowQueriesResponseDto, SlowQueryDto,
};
use crate::features::stats::services::DatabaseIntrospector;
use crate::shared::constants::{STATS_SLOW_QUERY_LIMIT, STATS_TABLE_SIZE_LIMIT};

const STATEMENT_STATS_MISSING: &str = "pg_stat_statements extension is not enabled";

/// Assembles diagnostics payloads. Never fails: engine errors are logged
/// and reported inside the payload.
pub struct StatsService {
    introspector: Arc<dyn DatabaseIntrospector>,
}

impl StatsService {
    pub fn new(introspector: Arc<dyn DatabaseIntrospector>) -> Self {
        Self { introspector }
    }

    pub async fn database(&self) -> DatabaseStatsResponseDto {
        let snapshot = async {
            let database = self.introspector.database_summary().await?;
            let table_sizes = self.introspector.table_sizes(STATS_TABLE_SIZE_LIMIT).await?;
            let row_counts = self.introspector.row_counts().await?;
            Ok::<_, sqlx::Error>((database, table_sizes, row_counts))
        };

        match snapshot.await {
            Ok((database, table_sizes, row_counts)) => DatabaseStatsResponseDto {
                database: Some(database),
                table_sizes,
                row_counts,
                error: None,
                timestamp: Utc::now(),
            },
            Err(e) => {
                tracing::warn!("Database statistics unavailable: {:?}", e);
                DatabaseStatsResponseDto {
                    database: None,
                    table_sizes: Vec::new(),
                    row_counts: Vec::new(),
                    error: Some("Database statistics are not available".to_string()),
                    timestamp: Utc::now(),
                }
            }
        }
    }

    pub async fn slow_queries(&self) -> SlowQueriesResponseDto {
        let mut response = SlowQueriesResponseDto {
            slow_queries: Vec::new(),
            warning: None,
            error: None,
            timestamp: Utc::now(),
        };

        match self.slow_query_ranking().await {
            Ok(Some(slow_queries)) => response.slow_queries = slow_queries,
            Ok(None) => response.warning = Some(STATEMENT_STATS_MISSING.to_string()),
            Err(e) => {
                tracing::warn!("Slow query statistics unavailable: {:?}", e);
                response.error = Some("pg_stat_statements not available".to_string());
            }
        }
        response
    }

    /// `None` when statement statistics are not collected
    async fn slow_query_ranking(&self) -> Result<Option<Vec<SlowQueryDto>>, sqlx::Error> {
        if !self.introspector.statement_stats_enabled().await? {
            return Ok(None);
        }
        self.introspector
            .slow_queries(STATS_SLOW_QUERY_LIMIT)
            .await
            .map(Some)
    }

    pub async fn connections(&self) -> ConnectionsResponseDto {
        let snapshot = async {
            let connections = self.introspector.connections().await?;
            let stats = self.introspector.connection_states().await?;
            Ok::<_, sqlx::Error>((connections, stats))
        };

        match snapshot.await {
            Ok((connections, stats)) => ConnectionsResponseDto {
                connections,
                stats,
                error: None,
                timestamp: Utc::now(),
            },
            Err(e) => {
                tracing::warn!("Connection statistics unavailable: {:?}", e);
                ConnectionsResponseDto {
                    connections: Vec::new(),
                    stats: Vec::new(),
                    error: Some("Connection statistics are not available".to_string()),
                    timestamp: Utc::now(),
                }
            }
        }
    }
}
