//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (AUTHHOOK__*, override)
//! 4. `PORT` (overrides server.port)

use axum::http::{HeaderName, HeaderValue};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (default: 3000)
    pub port: u16,
    /// Maximum accepted request body in bytes
    pub body_limit_bytes: usize,
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Socket address string to bind, e.g. "0.0.0.0:3000"
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared key the provider sends with every webhook call
    pub webhook_api_key: String,
    /// Header carrying the webhook API key
    pub api_key_header: String,
    /// Session token signing secret (32+ bytes)
    pub session_secret: String,
    /// Header carrying the session token (besides `Authorization: Bearer`)
    pub session_header: String,
    /// Cookie carrying the session token
    pub session_cookie: String,
    /// Session max age in seconds (default: 604800 = 7 days)
    pub session_max_age: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (AUTHHOOK__*)
    /// 5. PORT
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Environment, File};

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("AUTHHOOK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?;

        Self::from_builder(builder)
    }

    /// Builder preloaded with every default value
    pub fn defaults()
    -> Result<config::ConfigBuilder<config::builder::DefaultState>, crate::error::AppError> {
        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.body_limit_bytes", 100 * 1024)?
            .set_default("server.cors_allowed_origins", Vec::<String>::new())?
            .set_default("auth.api_key_header", "spec-api-key")?
            .set_default("auth.session_header", "spec-auth-token")?
            .set_default("auth.session_cookie", "spec_session")?
            .set_default("auth.session_max_age", 604800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;
        Ok(builder)
    }

    /// Build, deserialize and validate
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, crate::error::AppError> {
        let config = builder
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.webhook_api_key.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.webhook_api_key must not be empty".to_string(),
            ));
        }

        if self.auth.session_secret.len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be greater than 0".to_string(),
            ));
        }

        for (key, value) in [
            ("auth.api_key_header", &self.auth.api_key_header),
            ("auth.session_header", &self.auth.session_header),
        ] {
            if HeaderName::from_bytes(value.as_bytes()).is_err() {
                return Err(crate::error::AppError::Config(format!(
                    "{key} is not a valid header name: {value}"
                )));
            }
        }

        if self.auth.session_cookie.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.session_cookie must not be empty".to_string(),
            ));
        }

        for origin in &self.server.cors_allowed_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(crate::error::AppError::Config(format!(
                    "server.cors_allowed_origins contains an invalid origin: {origin}"
                )));
            }
        }

        Ok(())
    }
}

/// Complete, valid configuration for unit tests
#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            body_limit_bytes: 100 * 1024,
            cors_allowed_origins: Vec::new(),
        },
        auth: AuthConfig {
            webhook_api_key: "provider-key".to_string(),
            api_key_header: "spec-api-key".to_string(),
            session_secret: "x".repeat(32),
            session_header: "spec-auth-token".to_string(),
            session_cookie: "spec_session".to_string(),
            session_max_age: 604_800,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}
