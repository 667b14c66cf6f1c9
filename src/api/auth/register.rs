use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use chrono::Utc;

use pc_inventory::models::ROLE_NORMAL_USER;
use crate::api::{error_response, internal_error, is_unique_violation, ApiError};
use crate::state::AppState;
use super::types::*;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    req.validate()
        .map_err(|msg| error_response(StatusCode::BAD_REQUEST, msg))?;

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    let now = Utc::now().to_rfc3339();
    let email = req.email.trim();
    sqlx::query(
        "INSERT INTO users (email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?)"
    )
    .bind(email)
    .bind(&password_hash)
    .bind(ROLE_NORMAL_USER)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            error_response(StatusCode::CONFLICT, "Email already registered")
        } else {
            internal_error("Failed to create user")(e)
        }
    })?;

    tracing::info!("User registered: {}", email);
    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "data": {}, "message": "User created"})),
    ))
}
