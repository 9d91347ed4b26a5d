//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    #[serde(default)]
    pub jwt: JwtSettings,
    /// Business settings.
    #[serde(default)]
    pub app: AppSettings,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
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
    2
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    #[serde(default = "default_jwt_secret")]
    pub secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
            token_expiry_hours: default_token_expiry_hours(),
        }
    }
}

fn default_jwt_secret() -> String {
    "dev-secret-change-me".to_string()
}

fn default_token_expiry_hours() -> i64 {
    24
}

/// Business settings shared by handlers.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// IANA timezone used to resolve "this year" for fiscal defaults.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Service name reported by the root endpoint.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            service_name: default_service_name(),
        }
    }
}

fn default_timezone() -> String {
    "Asia/Jakarta".to_string()
}

fn default_service_name() -> String {
    "salesdesk-backend".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Environment variables use the `SALESDESK__` prefix with `__` between
    /// nested keys, e.g. `SALESDESK__DATABASE__URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SALESDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
