//! Centralized configuration management for stacklens
//!
//! This crate provides a unified configuration system that eliminates
//! duplication across the codebase and provides type-safe, validated
//! configuration with environment variable overrides.
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. Environment variable overrides
//! 3. Runtime validation

pub mod error;

pub use error::{ConfigError, ConfigResult};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::time::Duration;

// =============================================================================
// SAFE DEFAULTS - Work for any environment (dev, staging, prod, test)
// =============================================================================

// Database Configuration (safe local defaults)
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_NAME: &str = "stacklens";
const DEFAULT_DB_USER: &str = "stacklens";
const DEFAULT_DB_PASSWORD: &str = "localdev123";
const DEFAULT_DB_SSL_MODE: &str = "disable";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DB_MIN_CONNECTIONS: u32 = 2;
const DEFAULT_DB_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_DB_IDLE_TIMEOUT_SECONDS: u64 = 300;

// API Server Configuration
const DEFAULT_API_HOST: &str = "127.0.0.1"; // Localhost only for security
const DEFAULT_API_PORT: u16 = 3000;
const DEFAULT_API_ENABLE_DOCS: bool = true;

// Search defaults
const DEFAULT_SEARCH_PAGE_SIZE: i64 = 20;
const DEFAULT_SEARCH_MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_SUGGESTION_LIMIT: i64 = 5;

// Telemetry Configuration
const DEFAULT_TRACING_LEVEL: &str = "info";
const DEFAULT_TELEMETRY_SERVICE_NAME: &str = "stacklens";

/// Core configuration for the entire stacklens application
///
/// All settings have safe defaults and can be overridden via environment
/// variables. No profile/environment selection needed - same defaults work
/// everywhere.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ApplicationConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// API server configuration
    pub api: ApiConfig,

    /// Search behavior configuration
    pub search: SearchConfig,

    /// Telemetry and observability configuration
    pub telemetry: TelemetryConfig,
}

impl ApplicationConfig {
    /// Load the full application configuration from the environment
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            api: ApiConfig::from_env(),
            search: SearchConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }

    /// Validate cross-field constraints before the server starts
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any section holds an unusable value.
    pub fn validate(&self) -> ConfigResult<()> {
        self.database.validate()?;
        self.api.validate()?;
        self.search.validate()?;
        Ok(())
    }
}

/// `PostgreSQL` connection configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Database name
    pub database: String,

    /// Username for authentication
    pub username: String,

    /// Password for authentication (use environment variables for security)
    pub password: String,

    /// SSL mode for connections ("disable", "prefer", "require")
    pub ssl_mode: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Minimum number of connections in pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub timeout_seconds: u64,

    /// Idle timeout in seconds
    pub idle_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let host = std::env::var("STACKLENS_DATABASE_HOST")
            .or_else(|_| std::env::var("DB_HOST"))
            .unwrap_or_else(|_| DEFAULT_DB_HOST.to_string());

        let port = std::env::var("STACKLENS_DATABASE_PORT")
            .or_else(|_| std::env::var("DB_PORT"))
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DB_PORT);

        let database = std::env::var("STACKLENS_DATABASE_NAME")
            .or_else(|_| std::env::var("DB_NAME"))
            .unwrap_or_else(|_| DEFAULT_DB_NAME.to_string());

        let username = std::env::var("STACKLENS_DATABASE_USERNAME")
            .or_else(|_| std::env::var("DB_USER"))
            .unwrap_or_else(|_| DEFAULT_DB_USER.to_string());

        let password = std::env::var("STACKLENS_DATABASE_PASSWORD")
            .or_else(|_| std::env::var("DB_PASSWORD"))
            .unwrap_or_else(|_| {
                tracing::warn!(
                    "Using default database password '{}' - Set STACKLENS_DATABASE_PASSWORD or DB_PASSWORD environment variable. NEVER use default password in production!",
                    DEFAULT_DB_PASSWORD
                );
                DEFAULT_DB_PASSWORD.to_string()
            });

        let ssl_mode = std::env::var("STACKLENS_DATABASE_SSL_MODE")
            .or_else(|_| std::env::var("DB_SSLMODE"))
            .unwrap_or_else(|_| DEFAULT_DB_SSL_MODE.to_string());

        let max_connections = std::env::var("STACKLENS_DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);

        let min_connections = std::env::var("STACKLENS_DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DB_MIN_CONNECTIONS);

        let timeout_seconds = std::env::var("STACKLENS_DATABASE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DB_TIMEOUT_SECONDS);

        let idle_timeout_seconds = std::env::var("STACKLENS_DATABASE_IDLE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DB_IDLE_TIMEOUT_SECONDS);

        Self {
            host,
            port,
            database,
            username,
            password,
            ssl_mode,
            max_connections,
            min_connections,
            timeout_seconds,
            idle_timeout_seconds,
        }
    }

    /// Convert string SSL mode to `PgSslMode`
    fn parse_ssl_mode(&self) -> PgSslMode {
        match self.ssl_mode.as_str() {
            "disable" => PgSslMode::Disable,
            "require" => PgSslMode::Require,
            _ => PgSslMode::Prefer, // Safe default for "prefer" and unknown values
        }
    }

    /// Build `PostgreSQL` connection options (no URL with password exposed!)
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(self.parse_ssl_mode())
    }

    /// Create a `PostgreSQL` connection pool with proper configuration
    ///
    /// # Errors
    ///
    /// Returns an error if connection to database fails
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.timeout_seconds))
            .idle_timeout(Duration::from_secs(self.idle_timeout_seconds))
            .connect_with(self.connect_options())
            .await
    }

    /// Get connection info for logging (NO PASSWORD!)
    pub fn safe_connection_string(&self) -> String {
        format!(
            "postgresql://{}@{}:{}/{} (ssl: {})",
            self.username, self.host, self.port, self.database, self.ssl_mode
        )
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.host".to_string(),
                message: "host must not be empty".to_string(),
            });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                message: "pool must allow at least one connection".to_string(),
            });
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidValue {
                field: "database.min_connections".to_string(),
                message: "min_connections exceeds max_connections".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ApiConfig {
    /// Bind host for the HTTP listener
    pub host: String,

    /// Bind port for the HTTP listener
    pub port: u16,

    /// Serve the OpenAPI document and Swagger UI
    pub enable_docs: bool,
}

impl ApiConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let host = std::env::var("STACKLENS_API_HOST")
            .unwrap_or_else(|_| DEFAULT_API_HOST.to_string());

        let port = std::env::var("STACKLENS_API_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_PORT);

        let enable_docs = std::env::var("STACKLENS_API_ENABLE_DOCS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_ENABLE_DOCS);

        Self {
            host,
            port,
            enable_docs,
        }
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api.host".to_string(),
                message: "host must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Search behavior configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchConfig {
    /// Default page size when the caller does not supply `limit`
    pub default_page_size: i64,

    /// Hard cap on caller-supplied `limit`
    pub max_page_size: i64,

    /// Maximum number of "did you mean" suggestions
    pub suggestion_limit: i64,
}

impl SearchConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let default_page_size = std::env::var("STACKLENS_SEARCH_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SEARCH_PAGE_SIZE);

        let max_page_size = std::env::var("STACKLENS_SEARCH_MAX_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SEARCH_MAX_PAGE_SIZE);

        let suggestion_limit = std::env::var("STACKLENS_SEARCH_SUGGESTION_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SUGGESTION_LIMIT);

        Self {
            default_page_size,
            max_page_size,
            suggestion_limit,
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.default_page_size < 1 {
            return Err(ConfigError::InvalidValue {
                field: "search.default_page_size".to_string(),
                message: "page size must be at least 1".to_string(),
            });
        }
        if self.max_page_size < self.default_page_size {
            return Err(ConfigError::InvalidValue {
                field: "search.max_page_size".to_string(),
                message: "max page size smaller than default page size".to_string(),
            });
        }
        Ok(())
    }
}

/// Telemetry and observability configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetryConfig {
    /// Default tracing level when `RUST_LOG` is unset
    pub tracing_level: String,

    /// Service name attached to emitted spans
    pub service_name: String,
}

impl TelemetryConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let tracing_level = std::env::var("STACKLENS_TRACING_LEVEL")
            .unwrap_or_else(|_| DEFAULT_TRACING_LEVEL.to_string());

        let service_name = std::env::var("STACKLENS_TELEMETRY_SERVICE_NAME")
            .unwrap_or_else(|_| DEFAULT_TELEMETRY_SERVICE_NAME.to_string());

        Self {
            tracing_level,
            service_name,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // OK in tests
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ApplicationConfig {
            database: DatabaseConfig {
                host: DEFAULT_DB_HOST.to_string(),
                port: DEFAULT_DB_PORT,
                database: DEFAULT_DB_NAME.to_string(),
                username: DEFAULT_DB_USER.to_string(),
                password: DEFAULT_DB_PASSWORD.to_string(),
                ssl_mode: DEFAULT_DB_SSL_MODE.to_string(),
                max_connections: DEFAULT_DB_MAX_CONNECTIONS,
                min_connections: DEFAULT_DB_MIN_CONNECTIONS,
                timeout_seconds: DEFAULT_DB_TIMEOUT_SECONDS,
                idle_timeout_seconds: DEFAULT_DB_IDLE_TIMEOUT_SECONDS,
            },
            api: ApiConfig {
                host: DEFAULT_API_HOST.to_string(),
                port: DEFAULT_API_PORT,
                enable_docs: DEFAULT_API_ENABLE_DOCS,
            },
            search: SearchConfig {
                default_page_size: DEFAULT_SEARCH_PAGE_SIZE,
                max_page_size: DEFAULT_SEARCH_MAX_PAGE_SIZE,
                suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            },
            telemetry: TelemetryConfig {
                tracing_level: DEFAULT_TRACING_LEVEL.to_string(),
                service_name: DEFAULT_TELEMETRY_SERVICE_NAME.to_string(),
            },
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let mut database = DatabaseConfig::from_env();
        database.min_connections = 50;
        database.max_connections = 5;
        assert!(database.validate().is_err());
    }

    #[test]
    fn safe_connection_string_hides_password() {
        let database = DatabaseConfig::from_env();
        assert!(!database.safe_connection_string().contains(&database.password));
    }

    #[test]
    fn rejects_max_page_size_below_default() {
        let search = SearchConfig {
            default_page_size: 20,
            max_page_size: 10,
            suggestion_limit: 5,
        };
        assert!(search.validate().is_err());
    }
}
