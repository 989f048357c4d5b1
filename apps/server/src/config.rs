//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Bind address for the HTTP listener
    pub bind_addr: String,

    /// SQLite database file path
    pub db_path: String,

    /// Bootstrap password for the `admin` account (used only when the
    /// users table is empty on startup)
    pub admin_password: String,

    /// Bootstrap password for the `seller` account
    pub seller_password: String,

    /// API key for the AI insight provider (insights are disabled when unset)
    pub ai_api_key: Option<String>,

    /// Model identifier sent to the AI insight provider
    pub ai_model: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("STYLESTOCK_HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STYLESTOCK_HTTP_PORT".to_string()))?,

            bind_addr: env::var("STYLESTOCK_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),

            db_path: env::var("STYLESTOCK_DB_PATH")
                .unwrap_or_else(|_| "./stylestock.db".to_string()),

            admin_password: env::var("STYLESTOCK_ADMIN_PASSWORD").unwrap_or_else(|_| {
                // Development default
                // In production, this MUST be set via environment variable
                "admin-dev-password".to_string()
            }),

            seller_password: env::var("STYLESTOCK_SELLER_PASSWORD").unwrap_or_else(|_| {
                // Development default
                // In production, this MUST be set via environment variable
                "seller-dev-password".to_string()
            }),

            ai_api_key: env::var("STYLESTOCK_AI_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),

            ai_model: env::var("STYLESTOCK_AI_MODEL")
                .unwrap_or_else(|_| crate::services::insight::DEFAULT_MODEL.to_string()),
        };

        Ok(config)
    }

    /// Socket address string for the HTTP listener, e.g. `127.0.0.1:3000`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
