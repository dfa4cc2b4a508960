use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::stats::handlers;
use crate::features::stats::services::StatsService;

/// Create routes for the stats feature
pub fn routes(service: Arc<StatsService>) -> Router {
    Router::new()
        .route("/v1/stats/db", get(handlers::database_stats))
        .route("/v1/stats/queries", get(handlers::slow_queries))
        .route("/v1/stats/connections", get(handlers::connections))
        .with_state(service)
}
