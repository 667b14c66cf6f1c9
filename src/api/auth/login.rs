use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use pc_inventory::models::User;
use crate::api::{error_response, internal_error, ApiError};
use crate::auth::issue_token;
use crate::state::AppState;
use super::types::*;

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let invalid = || error_response(StatusCode::UNAUTHORIZED, "invalid credentials");

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(req.email.trim())
        .fetch_optional(&state.db)
        .await
        .map_err(internal_error("Failed to load user"))?
        .ok_or_else(invalid)?;

    let valid = bcrypt::verify(&req.password, &user.password_hash).map_err(|e| {
        tracing::error!("Failed to verify password hash: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;
    if !valid {
        tracing::debug!("Wrong password for {}", user.email);
        return Err(invalid());
    }

    let token = issue_token(&user, &state.config.auth.jwt_secret, state.config.auth.token_ttl_minutes)
        .map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;

    tracing::info!("User logged in: {}", user.email);
    Ok(Json(json!({ "token": token })))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_failures_are_401() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/login",
            None,
            Some(json!({"email": "admin@admin.com", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid credentials");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "whatever"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid credentials");
    }

    #[tokio::test]
    async fn test_admin_token_grants_access() {
        let app = test_app().await;
        let token = admin_token(&app).await;
        let (status, body) = send(&app, "GET", "/api/v1/categories", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 15);
    }
}
