//! Category and status tables / 分类与状态
//!
//! Both are `(id, name)` lookup tables referenced by products, so they share
//! one set of handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteRow;
use std::sync::Arc;
use chrono::Utc;

use pc_inventory::models::{validate_text, Category, NameRequest, Status};
use pc_inventory::search::DEFAULT_STATUS;
use crate::api::{error_response, internal_error, is_unique_violation, ApiError};
use crate::state::AppState;

pub trait LookupTable: for<'r> sqlx::FromRow<'r, SqliteRow> + Serialize + Send + Unpin + 'static {
    const TABLE: &'static str;
    /// Column in `products` pointing at this table.
    const PRODUCT_COLUMN: &'static str;
    const LABEL: &'static str;
    /// Row name the application depends on; it may not be renamed or deleted.
    const RESERVED: Option<&'static str> = None;

    fn name(&self) -> &str;
}

impl LookupTable for Category {
    const TABLE: &'static str = "categories";
    const PRODUCT_COLUMN: &'static str = "category_id";
    const LABEL: &'static str = "Category";

    fn name(&self) -> &str {
        &self.name
    }
}

impl LookupTable for Status {
    const TABLE: &'static str = "statuses";
    const PRODUCT_COLUMN: &'static str = "status_id";
    const LABEL: &'static str = "Status";
    const RESERVED: Option<&'static str> = Some(DEFAULT_STATUS);

    fn name(&self) -> &str {
        &self.name
    }
}

fn not_found<T: LookupTable>() -> ApiError {
    error_response(StatusCode::NOT_FOUND, format!("{} not found", T::LABEL))
}

fn ensure_not_reserved<T: LookupTable>(row: &T) -> Result<(), ApiError> {
    if T::RESERVED == Some(row.name()) {
        return Err(error_response(
            StatusCode::CONFLICT,
            format!("{} '{}' is required and cannot be renamed or deleted", T::LABEL, row.name()),
        ));
    }
    Ok(())
}

fn write_error<T: LookupTable>(context: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |e| {
        if is_unique_violation(&e) {
            error_response(StatusCode::CONFLICT, format!("{} name already exists", T::LABEL))
        } else {
            internal_error(context)(e)
        }
    }
}

async fn fetch<T: LookupTable>(state: &AppState, id: i64) -> Result<T, ApiError> {
    sqlx::query_as::<_, T>(&format!("SELECT id, name FROM {} WHERE id = ?", T::TABLE))
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(internal_error("Failed to load lookup row"))?
        .ok_or_else(not_found::<T>)
}

pub async fn list<T: LookupTable>(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let rows = sqlx::query_as::<_, T>(&format!("SELECT id, name FROM {} ORDER BY id", T::TABLE))
        .fetch_all(&state.db)
        .await
        .map_err(internal_error("Failed to list lookup rows"))?;
    Ok(Json(json!({"status": "success", "count": rows.len(), "data": rows})))
}

pub async fn get<T: LookupTable>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let row = fetch::<T>(&state, id).await?;
    Ok(Json(json!({"status": "success", "data": row})))
}

pub async fn create<T: LookupTable>(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NameRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = validate_text("name", req.name, 1, 100).map_err(|msg| error_response(StatusCode::BAD_REQUEST, msg))?;
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(&format!(
        "INSERT INTO {} (name, created_at, updated_at) VALUES (?, ?, ?)",
        T::TABLE
    ))
    .bind(&name)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(write_error::<T>("Failed to create lookup row"))?;

    tracing::info!("{} created: {}", T::LABEL, name);
    let row = fetch::<T>(&state, result.last_insert_rowid()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": row,
            "message": format!("{} created", T::LABEL)
        })),
    ))
}

pub async fn update<T: LookupTable>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<NameRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = validate_text("name", req.name, 1, 100).map_err(|msg| error_response(StatusCode::BAD_REQUEST, msg))?;
    let current = fetch::<T>(&state, id).await?;
    ensure_not_reserved(&current)?;

    let result = sqlx::query(&format!("UPDATE {} SET name = ?, updated_at = ? WHERE id = ?", T::TABLE))
        .bind(&name)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(write_error::<T>("Failed to update lookup row"))?;
    if result.rows_affected() == 0 {
        return Err(not_found::<T>());
    }

    let row = fetch::<T>(&state, id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": row,
        "message": format!("{} updated", T::LABEL)
    })))
}

pub async fn delete<T: LookupTable>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let row = fetch::<T>(&state, id).await?;
    ensure_not_reserved(&row)?;

    let in_use: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM products WHERE {} = ?",
        T::PRODUCT_COLUMN
    ))
    .bind(id)
    .fetch_one(&state.db)
    .await
    .map_err(internal_error("Failed to count product references"))?;
    if in_use > 0 {
        return Err(error_response(
            StatusCode::CONFLICT,
            format!("{} is still used by {} products", T::LABEL, in_use),
        ));
    }

    sqlx::query(&format!("DELETE FROM {} WHERE id = ?", T::TABLE))
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(internal_error("Failed to delete lookup row"))?;

    tracing::info!("{} {} deleted", T::LABEL, id);
    Ok(Json(json!({
        "status": "success",
        "data": row,
        "message": format!("{} deleted", T::LABEL)
    })))
}
