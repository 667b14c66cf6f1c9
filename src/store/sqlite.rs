//! SQLite record store / SQLite 记录存储

use anyhow::Context;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::RecordStore;
use crate::models::{Product, ProductRow, StatusId};
use crate::search::contains_query;

/// Product join used by every product read. Relations are always loaded.
pub const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.name, p.brand, p.model, p.description, p.stock, p.price,
           p.status_id, s.name AS status_name,
           p.category_id, c.name AS category_name,
           p.created_at, p.updated_at
    FROM products p
    INNER JOIN statuses s ON s.id = p.status_id
    INNER JOIN categories c ON c.id = p.category_id
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Load one product with its relations / 加载单个商品
pub async fn fetch_product(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Product>> {
    let sql = format!("{} WHERE p.id = ?", PRODUCT_SELECT);
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Product::from))
}

#[async_trait]
impl RecordStore for SqliteStore {
    type Record = Product;

    async fn resolve_status(&self, name: &str) -> anyhow::Result<Option<StatusId>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM statuses WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to resolve status")?;
        Ok(id.map(StatusId))
    }

    async fn find_by_text_and_status(&self, text: &str, status: StatusId) -> anyhow::Result<Vec<Product>> {
        // SQLite LOWER/LIKE only fold ASCII, so the substring test runs here
        let needle = text.to_lowercase();
        let products = self
            .find_by_status(status)
            .await
            .context("Failed to query products by text")?;
        Ok(products
            .into_iter()
            .filter(|p| contains_query(p, &needle))
            .collect())
    }

    async fn find_by_status(&self, status: StatusId) -> anyhow::Result<Vec<Product>> {
        let sql = format!("{} WHERE p.status_id = ? ORDER BY p.id", PRODUCT_SELECT);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .context("Failed to query products by status")?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::search::{MatchPhase, SearchEngine, SearchQuery};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn seeded_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();
        db::initialize_default_data(&pool, Some("password")).await.unwrap();
        pool
    }

    async fn stock(store: &SqliteStore) -> StatusId {
        store.resolve_status("stock").await.unwrap().unwrap()
    }

    async fn insert_product(pool: &SqlitePool, name: &str, status: &str) {
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO products (name, brand, model, description, stock, price, status_id, category_id, created_at, updated_at)
             VALUES (?, 'Generic', 'GEN-1', 'Generic accessory', 1, 1.0,
                     (SELECT id FROM statuses WHERE name = ?), (SELECT id FROM categories WHERE name = 'Perifericos'), ?, ?)",
        )
        .bind(name)
        .bind(status)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_resolve_status() {
        let store = SqliteStore::new(seeded_pool().await);
        assert!(store.resolve_status("stock").await.unwrap().is_some());
        assert!(store.resolve_status("sold out").await.unwrap().is_some());
        assert!(store.resolve_status("bogus-status").await.unwrap().is_none());
        assert!(store.resolve_status("STOCK").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_text_match_is_case_insensitive_substring() {
        let store = SqliteStore::new(seeded_pool().await);
        let status = stock(&store).await;

        let mice = store.find_by_text_and_status("MOUSE", status).await.unwrap();
        let names: Vec<&str> = mice.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Razer DeathAdder V3 Mouse", "Logitech G502 Mouse", "Corsair M65 RGB Elite Mouse"]
        );

        // Model and description participate too
        let by_model = store.find_by_text_and_status("rz03", status).await.unwrap();
        assert_eq!(by_model.len(), 1);
        assert_eq!(by_model[0].name, "Razer BlackWidow V4");

        let by_description = store.find_by_text_and_status("sniper", status).await.unwrap();
        assert_eq!(by_description[0].brand, "Corsair");
        assert_eq!(by_description[0].category.name, "Perifericos");
        assert_eq!(by_description[0].status.name, "stock");
    }

    #[tokio::test]
    async fn test_wildcards_match_literally() {
        let pool = seeded_pool().await;
        insert_product(&pool, "Hub 100% USB-C", "stock").await;
        let store = SqliteStore::new(pool);
        let status = stock(&store).await;

        assert!(store.find_by_text_and_status("_", status).await.unwrap().is_empty());
        let hits = store.find_by_text_and_status("100%", status).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Hub 100% USB-C");
    }

    #[tokio::test]
    async fn test_text_match_folds_accented_case() {
        let pool = seeded_pool().await;
        insert_product(&pool, "Ratón Óptico Inalámbrico", "stock").await;
        let store = SqliteStore::new(pool);
        let status = stock(&store).await;

        let upper = store.find_by_text_and_status("RATÓN", status).await.unwrap();
        let lower = store.find_by_text_and_status("ratón", status).await.unwrap();
        assert_eq!(upper.len(), 1);
        assert_eq!(lower.len(), 1);
        assert_eq!(upper[0].name, "Ratón Óptico Inalámbrico");

        let engine = SearchEngine::new(&store);
        let result = engine.search(&SearchQuery::new("ÓPTICO", "stock")).await.unwrap();
        assert_eq!(result.phase, MatchPhase::Exact);
        assert_eq!(result.count(), 1);
    }

    #[tokio::test]
    async fn test_status_restriction() {
        let pool = seeded_pool().await;
        insert_product(&pool, "Old Mouse", "sold out").await;
        let store = SqliteStore::new(pool);

        let stock_id = stock(&store).await;
        let sold_out = store.resolve_status("sold out").await.unwrap().unwrap();

        assert_eq!(store.find_by_status(stock_id).await.unwrap().len(), 4);
        let sold = store.find_by_status(sold_out).await.unwrap();
        assert_eq!(sold.len(), 1);
        assert_eq!(sold[0].name, "Old Mouse");

        let hits = store.find_by_text_and_status("mouse", stock_id).await.unwrap();
        assert!(hits.iter().all(|p| p.status_id == stock_id.0));
    }

    #[tokio::test]
    async fn test_fetch_product() {
        let pool = seeded_pool().await;
        let product = fetch_product(&pool, 1).await.unwrap().unwrap();
        assert_eq!(product.name, "Razer DeathAdder V3 Mouse");
        assert_eq!(product.stock, 15);
        assert!(fetch_product(&pool, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_engine_over_sqlite() {
        let store = SqliteStore::new(seeded_pool().await);
        let engine = SearchEngine::new(&store);

        // Brand typo: one edit from "razer"
        let result = engine.search(&SearchQuery::new("Razr", "stock")).await.unwrap();
        assert_eq!(result.phase, MatchPhase::Fuzzy);
        let names: Vec<&str> = result.records.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Razer DeathAdder V3 Mouse", "Razer BlackWidow V4"]);

        let result = engine.search(&SearchQuery::new("logitek", "")).await.unwrap();
        assert_eq!(result.phase, MatchPhase::Fuzzy);
        assert_eq!(result.count(), 1);
        assert_eq!(result.records[0].brand, "Logitech");

        let result = engine.search(&SearchQuery::new("xyz123nonexistent", "stock")).await.unwrap();
        assert!(result.is_empty());

        let result = engine.search(&SearchQuery::new("", "stock")).await.unwrap();
        assert_eq!(result.count(), 4);
    }
}
