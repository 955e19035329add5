use crate::service::monitoring::DEFAULT_REORDER_LEVEL;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONFIG_FILE: &str = "vendor-console";
const ENV_PREFIX: &str = "VENDOR_CONSOLE";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub inventory: InventoryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 上游商城后端
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 库存监控与草稿清理
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// 补货线: 不高于此值为紧急，不高于两倍为预警
    pub reorder_level: f64,
    /// 草稿批次保留时长 (小时)，超时未提交的草稿被清理
    pub draft_ttl_hours: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            reorder_level: DEFAULT_REORDER_LEVEL,
            draft_ttl_hours: 24,
        }
    }
}

impl InventoryConfig {
    pub fn draft_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.draft_ttl_hours.min(i64::MAX as u64) as i64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl LogConfig {
    /// 无法识别的级别按 INFO 处理
    pub fn level_filter(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            backend: BackendConfig {
                base_url: "http://localhost:3000/api".to_string(),
                timeout_secs: 30,
            },
            inventory: InventoryConfig::default(),
            log: LogConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// 加载顺序: 默认值 -> `vendor-console.toml` (可选) -> `VENDOR_CONSOLE__*` 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default("backend.timeout_secs", defaults.backend.timeout_secs as i64)?
            .set_default("inventory.reorder_level", defaults.inventory.reorder_level)?
            .set_default(
                "inventory.draft_ttl_hours",
                defaults.inventory.draft_ttl_hours as i64,
            )?
            .set_default("log.level", defaults.log.level)
    }
}
