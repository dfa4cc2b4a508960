use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Create routes for the comments feature
pub fn routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/v1/files/{id}/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/v1/comments/{id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
        .with_state(service)
}
