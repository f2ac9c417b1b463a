//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
    /// Identity provider configuration (optional).
    #[serde(default)]
    pub identity: Option<IdentitySettings>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Object storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage backend: `gcs`, `s3`, or `local_fs`.
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Bucket (or container / local root) holding uploaded images.
    pub bucket: String,
    /// Service-account credential JSON for GCS (inline or file path).
    #[serde(default)]
    pub credential: Option<String>,
    /// S3 endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// S3 access key ID.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// S3 region.
    #[serde(default)]
    pub region: Option<String>,
    /// Host used to build public object URLs.
    #[serde(default = "default_public_host")]
    pub public_host: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    /// Maximum number of photos accepted per upload request.
    #[serde(default = "default_max_photos_per_request")]
    pub max_photos_per_request: usize,
}

fn default_storage_backend() -> String {
    "gcs".to_string()
}

fn default_public_host() -> String {
    "storage.googleapis.com".to_string()
}

fn default_max_upload_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_max_photos_per_request() -> usize {
    5
}

/// Identity provider admin API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySettings {
    /// Base URL of the identity provider admin API.
    pub base_url: String,
    /// API key for admin operations.
    pub api_key: String,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PETTRACK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
