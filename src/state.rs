use sqlx::SqlitePool;

use pc_inventory::config::AppConfig;
use crate::auth::Policy;

/// Shared, read-only after startup / 启动后只读的共享状态
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub policy: Policy,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let policy = Policy::new(config.auth.policy.clone());
        Self { db, config, policy }
    }
}
