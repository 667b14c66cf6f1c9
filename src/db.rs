use sqlx::SqlitePool;
use anyhow::Result;
use chrono::Utc;
use rand::Rng;

use crate::models::ROLE_ADMIN;

/// Seeded administrator login / 默认管理员邮箱
pub const ADMIN_EMAIL: &str = "admin@admin.com";

const DEFAULT_CATEGORIES: [&str; 15] = [
    "Perifericos",
    "Monitores",
    "Gabinetes",
    "Procesadores",
    "Tarjetas Graficas",
    "Memoria RAM",
    "Placas Madre",
    "Almacenamiento",
    "Fuentes de Poder",
    "Refrigeracion",
    "Tarjetas de Sonido",
    "Tarjetas de Red",
    "Lectores Opticos",
    "Cables y Conectores",
    "Ventiladores",
];

const DEFAULT_STATUSES: [&str; 2] = ["stock", "sold out"];

// (name, brand, model, description, stock, price)
const SAMPLE_PRODUCTS: [(&str, &str, &str, &str, i64, f64); 4] = [
    ("Razer DeathAdder V3 Mouse", "Razer", "RZ01-04910100-R3U1", "Gaming mouse with ergonomic design", 15, 89.99),
    ("Razer BlackWidow V4", "Razer", "RZ03-04860100-R3U1", "Mechanical gaming keyboard", 8, 199.99),
    ("Logitech G502 Mouse", "Logitech", "910-005550", "High performance gaming mouse", 12, 79.99),
    ("Corsair M65 RGB Elite Mouse", "Corsair", "CH-9309011-NA", "FPS gaming mouse with sniper button", 10, 59.99),
];

/// Generate random password / 生成随机密码
fn generate_random_password(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789!@#$%^&*";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS statuses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            description TEXT NOT NULL,
            stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
            price REAL NOT NULL CHECK (price >= 0),
            status_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (status_id) REFERENCES statuses(id),
            FOREIGN KEY (category_id) REFERENCES categories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 外键索引
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_status ON products(status_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'normal_user',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migration completed");

    Ok(())
}

/// Initialize default data / 初始化默认数据
///
/// Each table is seeded only when it is empty, so this is safe to run on
/// every start.
pub async fn initialize_default_data(pool: &SqlitePool, admin_password: Option<&str>) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    if category_count == 0 {
        for name in DEFAULT_CATEGORIES {
            sqlx::query("INSERT INTO categories (name, created_at, updated_at) VALUES (?, ?, ?)")
                .bind(name)
                .bind(&now)
                .bind(&now)
                .execute(pool)
                .await?;
        }
        tracing::info!("Seeded {} categories", DEFAULT_CATEGORIES.len());
    }

    let status_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM statuses")
        .fetch_one(pool)
        .await?;
    if status_count == 0 {
        for name in DEFAULT_STATUSES {
            sqlx::query("INSERT INTO statuses (name, created_at, updated_at) VALUES (?, ?, ?)")
                .bind(name)
                .bind(&now)
                .bind(&now)
                .execute(pool)
                .await?;
        }
        tracing::info!("Seeded {} statuses", DEFAULT_STATUSES.len());
    }

    let admin_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(ADMIN_EMAIL)
        .fetch_one(pool)
        .await?;
    if admin_exists == 0 {
        let (password, generated) = match admin_password {
            Some(password) if !password.is_empty() => (password.to_string(), false),
            _ => (generate_random_password(16), true),
        };
        let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;

        sqlx::query(
            "INSERT INTO users (email, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)"
        )
        .bind(ADMIN_EMAIL)
        .bind(&password_hash)
        .bind(ROLE_ADMIN)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        tracing::info!("============================================================");
        tracing::info!("Default admin account created:");
        tracing::info!("  Email: {}", ADMIN_EMAIL);
        if generated {
            tracing::info!("  Password: {}", password);
            tracing::info!("WARNING: Please save the password, it is not shown again!");
        } else {
            tracing::info!("  Password: (auth.admin_password from config.json)");
        }
        tracing::info!("============================================================");
    }

    let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if product_count == 0 {
        let category_id: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE name = ?")
            .bind("Perifericos")
            .fetch_optional(pool)
            .await?;
        let status_id: Option<i64> = sqlx::query_scalar("SELECT id FROM statuses WHERE name = ?")
            .bind("stock")
            .fetch_optional(pool)
            .await?;

        // 用户可能已删除默认分类或状态
        if let (Some(category_id), Some(status_id)) = (category_id, status_id) {
            for (name, brand, model, description, stock, price) in SAMPLE_PRODUCTS {
                sqlx::query(
                    "INSERT INTO products (name, brand, model, description, stock, price, status_id, category_id, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
                )
                .bind(name)
                .bind(brand)
                .bind(model)
                .bind(description)
                .bind(stock)
                .bind(price)
                .bind(status_id)
                .bind(category_id)
                .bind(&now)
                .bind(&now)
                .execute(pool)
                .await?;
            }
            tracing::info!("Seeded {} sample products", SAMPLE_PRODUCTS.len());
        }
    }

    Ok(())
}
