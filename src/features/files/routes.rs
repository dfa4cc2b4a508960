use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::files::handlers;
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/v1/files",
            get(handlers::list_files).post(handlers::create_file),
        )
        .route(
            "/v1/files/{id}",
            get(handlers::get_file)
                .put(handlers::update_file)
                .delete(handlers::delete_file),
        )
        .route("/v1/files/{id}/view", post(handlers::view_file))
        .route("/v1/users/{id}/files", get(handlers::list_user_files))
        .with_state(service)
}
