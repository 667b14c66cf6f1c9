//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration / 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Search configuration / 搜索配置
    #[serde(default)]
    pub search: SearchConfig,
    /// Authentication configuration / 认证配置
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Database configuration / 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Data directory path / 数据目录路径
    pub data_dir: String,
    /// Main database file path (relative to data_dir) / 主数据库文件路径
    pub db_file: String,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of fuzzy fallback matches returned / 模糊匹配最大返回数
    pub fuzzy_limit: usize,
}

/// Authentication configuration / 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Filled in on first start when empty.
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in minutes / 令牌有效期（分钟）
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
    /// Password for the seeded admin account; random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    /// Role policy rules / 角色权限规则
    #[serde(default = "default_policy")]
    pub policy: Vec<PolicyRule>,
}

/// One `(role, path, method)` grant. A trailing `*` in `path` matches any
/// suffix, and `method = "*"` matches every method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub role: String,
    pub path: String,
    pub method: String,
}

impl PolicyRule {
    pub fn new(role: &str, path: &str, method: &str) -> Self {
        Self {
            role: role.to_string(),
            path: path.to_string(),
            method: method.to_string(),
        }
    }
}

fn default_token_ttl() -> i64 {
    60
}

fn default_policy() -> Vec<PolicyRule> {
    vec![
        PolicyRule::new("admin", "*", "*"),
        PolicyRule::new("normal_user", "/api/v1/products/*", "GET"),
        PolicyRule::new("normal_user", "/api/v1/categories*", "GET"),
        PolicyRule::new("normal_user", "/api/v1/statuses*", "GET"),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            db_file: "pc_inventory.db".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_limit: crate::search::DEFAULT_FUZZY_LIMIT,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: default_token_ttl(),
            admin_password: None,
            policy: default_policy(),
        }
    }
}

impl AppConfig {
    /// Get the full database URL / 获取完整的数据库URL
    pub fn get_database_url(&self) -> String {
        let db_path = Path::new(&self.database.data_dir).join(&self.database.db_file);
        format!("sqlite:{}?mode=rwc", db_path.to_string_lossy())
    }

    /// Get the full data directory path / 获取完整的数据目录路径
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.database.data_dir)
    }

    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Generate a random signing secret / 生成随机签名密钥
pub fn generate_secret(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from ./config.json / 加载配置文件
///
/// A non-empty `JWT_SECRET` environment variable takes precedence over the file.
pub fn load_config() -> Result<AppConfig, String> {
    let env_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
    load_config_from(&get_config_path(), env_secret)
}

/// Load configuration from `path`, or create default if not exists / 加载配置文件，不存在则创建默认配置
///
/// `jwt_secret` overrides the file's secret in memory only. Without it, a
/// missing secret is generated and written back so tokens stay valid across
/// restarts.
pub fn load_config_from(config_path: &Path, jwt_secret: Option<String>) -> Result<AppConfig, String> {
    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;
        tracing::info!("Loaded configuration from {:?}", config_path);
        config
    } else {
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        config
    };

    match jwt_secret {
        Some(secret) => {
            config.auth.jwt_secret = secret;
            tracing::info!("Using JWT secret from environment");
        }
        None if config.auth.jwt_secret.is_empty() => {
            config.auth.jwt_secret = generate_secret(48);
            save_config_to(&config, config_path)?;
            tracing::info!("Generated JWT secret and saved it to {:?}", config_path);
        }
        None => {}
    }

    Ok(config)
}

/// Save configuration to file / 保存配置到文件
pub fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.get_bind_address(), "0.0.0.0:8080");
        assert_eq!(config.search.fuzzy_limit, 20);
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert!(config.auth.policy.iter().any(|r| r.role == "admin" && r.path == "*"));
        assert!(config.get_database_url().starts_with("sqlite:"));
        assert!(config.get_database_url().ends_with("pc_inventory.db?mode=rwc"));
    }

    #[test]
    fn test_creates_default_file_with_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let created = load_config_from(&path, None).unwrap();
        assert!(path.exists());
        assert_eq!(created.auth.jwt_secret.len(), 48);

        // Second load reads the same secret back
        let loaded = load_config_from(&path, None).unwrap();
        assert_eq!(loaded.auth.jwt_secret, created.auth.jwt_secret);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"host": "127.0.0.1", "port": 9000}}"#).unwrap();

        let config = load_config_from(&path, None).unwrap();
        assert_eq!(config.get_bind_address(), "127.0.0.1:9000");
        assert_eq!(config.database.db_file, "pc_inventory.db");
        assert!(!config.auth.jwt_secret.is_empty());
        assert_eq!(config.auth.policy.len(), 4);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_config_from(&path, None).unwrap_err();
        assert!(err.starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_env_secret_is_never_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        // Missing file: defaults are written without a secret
        let config = load_config_from(&path, Some("from-env".to_string())).unwrap();
        assert_eq!(config.auth.jwt_secret, "from-env");
        let on_disk: AppConfig = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk.auth.jwt_secret.is_empty());

        // Existing secretless file is left untouched
        let before = std::fs::read_to_string(&path).unwrap();
        let config = load_config_from(&path, Some("from-env".to_string())).unwrap();
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

        // Without the override the secret is generated and saved
        let generated = load_config_from(&path, None).unwrap();
        assert_eq!(generated.auth.jwt_secret.len(), 48);
        let on_disk: AppConfig = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.auth.jwt_secret, generated.auth.jwt_secret);

        // Override still wins over a stored secret
        let config = load_config_from(&path, Some("from-env".to_string())).unwrap();
        assert_eq!(config.auth.jwt_secret, "from-env");
    }
}
