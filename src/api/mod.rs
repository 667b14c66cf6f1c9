pub mod auth;
pub mod lookups;
pub mod products;
pub mod server;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use pc_inventory::models::{Category, Status};
use crate::state::AppState;

/// Handler error: status code plus `{"error": ...}` body.
pub type ApiError = (StatusCode, Json<Value>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({"error": message.into()})))
}

/// Log an internal failure and hide it behind a generic 500.
pub fn internal_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |e| {
        tracing::error!("{}: {}", context, e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Build the `/api/v1` router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/v1/products", post(products::create_product))
        .route("/api/v1/products/search", get(products::search_products))
        .route(
            "/api/v1/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/v1/products/:id/stock", put(products::update_stock))
        .route(
            "/api/v1/categories",
            get(lookups::list::<Category>).post(lookups::create::<Category>),
        )
        .route(
            "/api/v1/categories/:id",
            get(lookups::get::<Category>)
                .put(lookups::update::<Category>)
                .delete(lookups::delete::<Category>),
        )
        .route(
            "/api/v1/statuses",
            get(lookups::list::<Status>).post(lookups::create::<Status>),
        )
        .route(
            "/api/v1/statuses/:id",
            get(lookups::get::<Status>)
                .put(lookups::update::<Status>)
                .delete(lookups::delete::<Status>),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), crate::auth::require_auth));

    Router::new()
        .route("/api/v1/health", get(server::health_check))
        .route("/api/v1/register", post(auth::register))
        .route("/api/v1/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_missing_and_malformed_header() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/api/v1/products/search?q=mouse", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing authorization header");

        let (status, body) = send(&app, "GET", "/api/v1/categories", Some(""), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Malformed authorization header");

        let (status, body) = send(&app, "GET", "/api/v1/categories", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_normal_user_is_read_only() {
        let app = test_app().await;
        let token = user_token(&app).await;

        let (status, body) = send(&app, "GET", "/api/v1/products/search?q=mouse", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);

        let (status, _) = send(&app, "GET", "/api/v1/statuses", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/products/1/stock",
            Some(&token),
            Some(json!({"stock": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Insufficient permissions");
        assert_eq!(
            body["details"],
            "Role 'normal_user' cannot 'PUT' on '/api/v1/products/1/stock'"
        );
    }
}
