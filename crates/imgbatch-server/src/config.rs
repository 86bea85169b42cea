//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database host.
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Default database port.
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Default database user.
pub const DEFAULT_DB_USER: &str = "root";

/// Default database name.
pub const DEFAULT_DB_NAME: &str = "test";

/// Default maximum database connections in the pool.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Default database connection timeout in seconds.
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default staging directory for uploaded batch files.
pub const DEFAULT_UPLOAD_DIR: &str = "./upload";

/// Default output directory for compressed images.
pub const DEFAULT_IMAGE_DIR: &str = "./images";

/// URL path under which compressed images are served.
pub const STATIC_IMAGE_PATH: &str = "/images";

/// Default multipart body limit (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default number of in-flight enrichments per product.
pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 1;

/// Default compression API endpoint.
pub const DEFAULT_TINIFY_ENDPOINT: &str = "https://api.tinify.com";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub compression: CompressionConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Prefix of every compressed image URL handed back to callers
    pub public_base_url: String,
}

/// Which [`crate::store::ProductStore`] implementation to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    MySql,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::MySql),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown STORE_BACKEND '{}': expected 'mysql' or 'memory'",
                other
            )),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub upload_dir: PathBuf,
    pub image_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub enrichment_concurrency: usize,
}

/// Compression provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub endpoint: String,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = env_parse("PORT", DEFAULT_SERVER_PORT);

        let config = Config {
            server: ServerConfig {
                host: env_or("HOST", DEFAULT_SERVER_HOST),
                port,
                shutdown_timeout_secs: env_parse("SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT_SECS),
                public_base_url: std::env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            },
            database: DatabaseConfig {
                backend: env_or("STORE_BACKEND", "mysql").parse()?,
                host: env_or("DB_HOST", DEFAULT_DB_HOST),
                port: env_parse("DB_PORT", DEFAULT_DB_PORT),
                user: env_or("DB_USER", DEFAULT_DB_USER),
                password: env_or("DB_PASSWORD", ""),
                name: env_or("DB_NAME", DEFAULT_DB_NAME),
                max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
                connect_timeout_secs: env_parse("DB_CONNECT_TIMEOUT", DEFAULT_DB_CONNECT_TIMEOUT_SECS),
            },
            pipeline: PipelineConfig {
                upload_dir: PathBuf::from(env_or("UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
                image_dir: PathBuf::from(env_or("IMAGE_DIR", DEFAULT_IMAGE_DIR)),
                max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
                enrichment_concurrency: env_parse(
                    "ENRICHMENT_CONCURRENCY",
                    DEFAULT_ENRICHMENT_CONCURRENCY,
                ),
            },
            compression: CompressionConfig {
                api_key: env_or("TINIFY_API_KEY", ""),
                endpoint: env_or("TINIFY_ENDPOINT", DEFAULT_TINIFY_ENDPOINT),
            },
            cors: CorsConfig {
                allowed_origins: env_or("CORS_ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS", false),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        url::Url::parse(&self.server.public_base_url).map_err(|e| {
            anyhow::anyhow!(
                "PUBLIC_BASE_URL '{}' is not a valid URL: {}",
                self.server.public_base_url,
                e
            )
        })?;

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.pipeline.enrichment_concurrency == 0 {
            anyhow::bail!("ENRICHMENT_CONCURRENCY must be greater than 0");
        }

        if self.compression.api_key.is_empty() {
            tracing::warn!("TINIFY_API_KEY is not set - every image enrichment will fail");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                public_base_url: format!("http://localhost:{}", DEFAULT_SERVER_PORT),
            },
            database: DatabaseConfig {
                backend: StoreBackend::MySql,
                host: DEFAULT_DB_HOST.to_string(),
                port: DEFAULT_DB_PORT,
                user: DEFAULT_DB_USER.to_string(),
                password: String::new(),
                name: DEFAULT_DB_NAME.to_string(),
                max_connections: DEFAULT_DB_MAX_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
            },
            pipeline: PipelineConfig {
                upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
                image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                enrichment_concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
            },
            compression: CompressionConfig {
                api_key: String::new(),
                endpoint: DEFAULT_TINIFY_ENDPOINT.to_string(),
            },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_string()],
                allow_credentials: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "PUBLIC_BASE_URL",
        "DB_HOST",
        "DB_USER",
        "DB_PASSWORD",
        "DB_NAME",
        "STORE_BACKEND",
        "ENRICHMENT_CONCURRENCY",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_match_documented_values() {
        clear_env();
        let config = Config::load().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.public_base_url, "http://localhost:3000");
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.user, "root");
        assert_eq!(config.database.password, "");
        assert_eq!(config.database.name, "test");
        assert_eq!(config.database.backend, StoreBackend::MySql);
    }

    #[test]
    #[serial]
    fn test_port_feeds_public_base_url() {
        clear_env();
        std::env::set_var("PORT", "8081");
        let config = Config::load().unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.public_base_url, "http://localhost:8081");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_database_overrides() {
        clear_env();
        std::env::set_var("DB_HOST", "db.internal");
        std::env::set_var("DB_USER", "catalog");
        std::env::set_var("DB_NAME", "products");
        std::env::set_var("STORE_BACKEND", "memory");
        let config = Config::load().unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.user, "catalog");
        assert_eq!(config.database.name, "products");
        assert_eq!(config.database.backend, StoreBackend::Memory);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_backend_rejected() {
        clear_env();
        std::env::set_var("STORE_BACKEND", "postgres");
        assert!(Config::load().is_err());
        clear_env();
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.pipeline.enrichment_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.server.public_base_url = "localhost without scheme".to_string();
        assert!(config.validate().is_err());
    }
}
