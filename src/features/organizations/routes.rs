use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::organizations::handlers;
use crate::features::organizations::services::OrganizationService;

/// Create routes for the organizations feature
pub fn routes(service: Arc<OrganizationService>) -> Router {
    Router::new()
        .route(
            "/v1/organizations",
            get(handlers::list_organizations).post(handlers::create_organization),
        )
        .route(
            "/v1/organizations/{id}",
            get(handlers::get_organization)
                .put(handlers::update_organization)
                .delete(handlers::delete_organization),
        )
        .with_state(service)
}
