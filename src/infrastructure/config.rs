use serde::Deserialize;

/// Application configuration for the importer server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub import: ImportConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8110
}

/// DatabaseConfig は PostgreSQL 接続の設定を表す。
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// RedisConfig は Redis 接続の設定を表す。
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

/// ImportConfig は CSV インポートパイプライン固有の設定を表す。
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// 1チャンク＝1アトミック書き込みの行数
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_progress_ttl")]
    pub progress_ttl_seconds: u64,
    /// キャンセルマーカーの TTL。ジョブ全体の TTL 上限（2時間）を兼ねる。
    #[serde(default = "default_cancel_ttl")]
    pub cancel_ttl_seconds: u64,
    #[serde(default = "default_listing_cache_ttl")]
    pub listing_cache_ttl_seconds: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            progress_ttl_seconds: default_progress_ttl(),
            cancel_ttl_seconds: default_cancel_ttl(),
            listing_cache_ttl_seconds: default_listing_cache_ttl(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_progress_ttl() -> u64 {
    3600
}

fn default_cancel_ttl() -> u64 {
    7200
}

fn default_listing_cache_ttl() -> u64 {
    300
}
