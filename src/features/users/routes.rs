use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

/// Create routes for the users feature
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/v1/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/v1/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{lazy_pool, test_server};

    fn server() -> axum_test::TestServer {
        test_server(routes(Arc::new(UserService::new(lazy_pool()))))
    }

    #[tokio::test]
    async fn test_create_lists_every_invalid_field() {
        let response = server()
            .post("/v1/users")
            .json(&json!({ "email": "not-an-email" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(
            body["errors"],
            json!(["email: must be a valid email address", "name: is required"])
        );
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_avatar() {
        let response = server()
            .put(&format!("/v1/users/{}", uuid::Uuid::new_v4()))
            .json(&json!({ "avatar_url": "nope" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["errors"], json!(["avatar_url: must be a valid URL"]));
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        let response = server().get("/v1/users/not-a-uuid").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
