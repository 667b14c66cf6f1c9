use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use chrono::Utc;

use pc_inventory::models::{
    CreateProductRequest, NewProduct, Product, UpdateProductRequest, UpdateStockRequest, validate_stock,
};
use pc_inventory::search::{SearchEngine, SearchError, SearchQuery, DEFAULT_STATUS};
use pc_inventory::store::{sqlite::fetch_product, SqliteStore};
use crate::api::{error_response, internal_error, is_unique_violation, ApiError};
use crate::auth::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub status: String,
}

/// GET /api/v1/products/search - 商品搜索
pub async fn search_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let store = SqliteStore::new(state.db.clone());
    let engine = SearchEngine::new(&store).with_fuzzy_limit(state.config.search.fuzzy_limit);

    match engine.search(&SearchQuery::new(params.q, params.status)).await {
        Ok(result) => {
            tracing::debug!("Found {} products ({:?} phase)", result.count(), result.phase);
            Ok(Json(json!({
                "status": "success",
                "count": result.count(),
                "data": result.records,
            })))
        }
        Err(e @ SearchError::InvalidFilter(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid status parameter",
                "details": e.to_string()
            })),
        )),
        Err(e @ SearchError::StoreUnavailable(_)) => {
            tracing::error!("Product search failed: {}", e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to search products"))
        }
    }
}

async fn load_product(db: &SqlitePool, id: i64) -> Result<Product, ApiError> {
    fetch_product(db, id)
        .await
        .map_err(internal_error("Failed to load product"))?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Product not found"))
}

/// Check the referenced rows exist; returns the status id to store.
async fn resolve_relations(db: &SqlitePool, product: &NewProduct) -> Result<i64, ApiError> {
    let status_id: Option<i64> = match product.status_id {
        Some(id) => sqlx::query_scalar("SELECT id FROM statuses WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(internal_error("Failed to load status"))?,
        None => sqlx::query_scalar("SELECT id FROM statuses WHERE name = ?")
            .bind(DEFAULT_STATUS)
            .fetch_optional(db)
            .await
            .map_err(internal_error("Failed to load status"))?,
    };
    let status_id = status_id.ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Status not found"))?;

    let category: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
        .bind(product.category_id)
        .fetch_optional(db)
        .await
        .map_err(internal_error("Failed to load category"))?;
    if category.is_none() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Category not found"));
    }

    Ok(status_id)
}

fn write_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |e| {
        if is_unique_violation(&e) {
            error_response(StatusCode::CONFLICT, "A product with this name already exists")
        } else {
            internal_error(context)(e)
        }
    }
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let product = load_product(&state.db, id).await?;
    Ok(Json(json!({"status": "success", "data": product})))
}

/// POST /api/v1/products - 创建商品
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let product = NewProduct::try_from(req).map_err(|msg| error_response(StatusCode::BAD_REQUEST, msg))?;
    let status_id = resolve_relations(&state.db, &product).await?;

    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO products (name, brand, model, description, stock, price, status_id, category_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&product.name)
    .bind(&product.brand)
    .bind(&product.model)
    .bind(&product.description)
    .bind(product.stock)
    .bind(product.price)
    .bind(status_id)
    .bind(product.category_id)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(write_error("Failed to create product"))?;

    let id = result.last_insert_rowid();
    tracing::info!("Product {} created by {}", id, user.email);

    let created = load_product(&state.db, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": created,
            "message": "Product created successfully"
        })),
    ))
}

/// PUT /api/v1/products/:id - 更新商品
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Value>, ApiError> {
    let current = load_product(&state.db, id).await?;
    let product = NewProduct::merged(&current, req).map_err(|msg| error_response(StatusCode::BAD_REQUEST, msg))?;
    let status_id = resolve_relations(&state.db, &product).await?;

    sqlx::query(
        "UPDATE products SET name = ?, brand = ?, model = ?, description = ?, stock = ?, price = ?,
                status_id = ?, category_id = ?, updated_at = ?
         WHERE id = ?"
    )
    .bind(&product.name)
    .bind(&product.brand)
    .bind(&product.model)
    .bind(&product.description)
    .bind(product.stock)
    .bind(product.price)
    .bind(status_id)
    .bind(product.category_id)
    .bind(Utc::now().to_rfc3339())
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(write_error("Failed to update product"))?;

    tracing::info!("Product {} updated by {}", id, user.email);

    let updated = load_product(&state.db, id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": updated,
        "message": "Product Updated"
    })))
}

/// PUT /api/v1/products/:id/stock - 更新库存
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<Value>, ApiError> {
    let stock = validate_stock(req.stock).map_err(|msg| error_response(StatusCode::BAD_REQUEST, msg))?;

    let result = sqlx::query("UPDATE products SET stock = ?, updated_at = ? WHERE id = ?")
        .bind(stock)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(internal_error("Failed to update stock"))?;

    if result.rows_affected() == 0 {
        return Err(error_response(StatusCode::NOT_FOUND, "Product not found"));
    }
    tracing::info!("Product {} stock set to {} by {}", id, stock, user.email);

    let product = load_product(&state.db, id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": product,
        "message": "Product stock updated successfully"
    })))
}

/// DELETE /api/v1/products/:id - 删除商品
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let product = load_product(&state.db, id).await?;

    sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(internal_error("Failed to delete product"))?;

    tracing::info!("Product {} deleted by {} ({})", id, user.email, user.role);
    Ok(Json(json!({
        "status": "success",
        "data": product,
        "message": "Product Deleted"
    })))
}
