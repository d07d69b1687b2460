use crate::errors::AppError;
use config::Config;
use serde::Deserialize;
use std::path::Path;

/// 默认连接串只作占位，不带任何凭据
pub const DEFAULT_DATABASE_URL: &str = "mongodb://localhost:27017";
pub const DEFAULT_DB_NAME: &str = "valorant";
pub const DEFAULT_CHARACTERS_URL: &str = "https://raw.githubusercontent.com/bayQrr/api/refs/heads/main/characters.json";
/// 兼容旧部署方式的连接串环境变量
pub const DATABASE_URL_ENV: &str = "URI";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub seed: Option<SeedConfig>,
    pub sys: Option<SysConfig>,
}

impl AppConfig {
    /// 加载顺序：配置文件（可选） -> `APP__*` 环境变量 -> `URI` 环境变量
    pub fn new(file: Option<&str>) -> Result<Self, AppError> {
        Self::with_url_override(file, std::env::var(DATABASE_URL_ENV).ok())
    }

    pub fn with_url_override(file: Option<&str>, url: Option<String>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            let required = Path::new(file).exists();
            builder = builder.add_source(config::File::with_name(file).required(required));
        }
        let config = builder
            .add_source(config::Environment::with_prefix("APP").prefix_separator("__").separator("__"))
            .set_override_option("database.url", url)?
            .build()?;
        let cfg = config.try_deserialize::<AppConfig>()?;
        Ok(cfg)
    }

    pub fn get_database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }
    pub fn get_seed(&self) -> SeedConfig {
        self.seed.clone().unwrap_or_default()
    }
    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_db_name")]
    pub db_name: String,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: default_database_url(), db_name: default_db_name() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    //角色数据源
    #[serde(default = "default_characters_url")]
    pub characters_url: String,
}
impl Default for SeedConfig {
    fn default() -> Self {
        Self { characters_url: default_characters_url() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SysConfig {
    //全局日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
}
impl Default for SysConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}
fn default_db_name() -> String {
    DEFAULT_DB_NAME.to_string()
}
fn default_characters_url() -> String {
    DEFAULT_CHARACTERS_URL.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
