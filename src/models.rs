use serde::{Deserialize, Serialize};

use crate::search::Candidate;

/// Role assigned to self-registered accounts
pub const ROLE_NORMAL_USER: &str = "normal_user";
/// Role with unrestricted access
pub const ROLE_ADMIN: &str = "admin";

/// Identity of a product status row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct StatusId(pub i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Status {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A product with its status and category already joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub description: String,
    pub stock: u32,
    pub price: f64,
    pub status_id: i64,
    pub status: Status,
    pub category_id: i64,
    pub category: Category,
    pub created_at: String,
    pub updated_at: String,
}

/// Flat row produced by the product/status/category join.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub description: String,
    pub stock: u32,
    pub price: f64,
    pub status_id: i64,
    pub status_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            model: row.model,
            description: row.description,
            stock: row.stock,
            price: row.price,
            status_id: row.status_id,
            status: Status {
                id: row.status_id,
                name: row.status_name,
            },
            category_id: row.category_id,
            category: Category {
                id: row.category_id,
                name: row.category_name,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Candidate for Product {
    fn search_fields(&self) -> [&str; 4] {
        [&self.name, &self.brand, &self.model, &self.description]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub description: String,
    pub stock: i64,
    pub price: f64,
    pub category_id: i64,
    #[serde(default)]
    pub status_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub status_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStockRequest {
    pub stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Product fields after boundary validation. Built only through
/// `TryFrom<CreateProductRequest>`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub description: String,
    pub stock: u32,
    pub price: f64,
    pub category_id: i64,
    pub status_id: Option<i64>,
}

impl TryFrom<CreateProductRequest> for NewProduct {
    type Error = String;

    fn try_from(req: CreateProductRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: validate_text("name", req.name, 2, 100)?,
            brand: validate_text("brand", req.brand, 2, 50)?,
            model: validate_text("model", req.model, 1, 50)?,
            description: validate_text("description", req.description, 5, 255)?,
            stock: validate_stock(req.stock)?,
            price: validate_price(req.price)?,
            category_id: req.category_id,
            status_id: req.status_id,
        })
    }
}

impl NewProduct {
    /// Merge a partial update over an existing product, validating only the
    /// fields that were supplied.
    pub fn merged(current: &Product, req: UpdateProductRequest) -> Result<Self, String> {
        Ok(Self {
            name: match req.name {
                Some(v) => validate_text("name", v, 2, 100)?,
                None => current.name.clone(),
            },
            brand: match req.brand {
                Some(v) => validate_text("brand", v, 2, 50)?,
                None => current.brand.clone(),
            },
            model: match req.model {
                Some(v) => validate_text("model", v, 1, 50)?,
                None => current.model.clone(),
            },
            description: match req.description {
                Some(v) => validate_text("description", v, 5, 255)?,
                None => current.description.clone(),
            },
            stock: match req.stock {
                Some(v) => validate_stock(v)?,
                None => current.stock,
            },
            price: match req.price {
                Some(v) => validate_price(v)?,
                None => current.price,
            },
            category_id: req.category_id.unwrap_or(current.category_id),
            status_id: Some(req.status_id.unwrap_or(current.status_id)),
        })
    }
}

/// Trim `value` and check its length in characters.
pub fn validate_text(field: &str, value: String, min: usize, max: usize) -> Result<String, String> {
    let value = value.trim().to_string();
    let len = value.chars().count();
    if len < min || len > max {
        return Err(format!("{} must be between {} and {} characters", field, min, max));
    }
    Ok(value)
}

pub fn validate_stock(stock: i64) -> Result<u32, String> {
    if stock < 0 {
        return Err("Stock cannot be negative".to_string());
    }
    u32::try_from(stock).map_err(|_| "Invalid stock value".to_string())
}

pub fn validate_price(price: f64) -> Result<f64, String> {
    if !price.is_finite() || price < 0.0 {
        return Err("Invalid price value".to_string());
    }
    Ok(price)
}
