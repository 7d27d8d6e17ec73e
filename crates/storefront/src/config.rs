//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8000)
//! - `STOREFRONT_APP_NAME` - Name shown by `GET /` (default: Storefront API)
//! - `STOREFRONT_CORS_ORIGINS` - Comma-separated browser origins allowed to
//!   call the API (default: localhost and 127.0.0.1 on ports 3000 and 3001)
//! - `STOREFRONT_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `STOREFRONT_DB_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 10)
//! - `STOREFRONT_DB_RETRY_ATTEMPTS` - Attempts for transient database
//!   failures, including the first (default: 3)
//! - `STOREFRONT_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `STOREFRONT_AUTO_MIGRATE` - Apply migrations at startup (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;
use thiserror::Error;

use crate::db::RetryPolicy;

const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://127.0.0.1:3000,http://localhost:3001,http://127.0.0.1:3001";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Application name, echoed by the root endpoint
    pub app_name: String,
    /// Browser origins allowed by CORS
    pub cors_origins: Vec<HeaderValue>,
    /// Requests running longer than this are aborted and rolled back
    pub request_timeout: Duration,
    /// Apply pending migrations before serving
    pub auto_migrate: bool,
    /// Database pool and retry settings
    pub database: DatabaseConfig,
    /// Error tracking settings
    pub sentry: SentryConfig,
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub url: SecretString,
    /// Maximum pool size
    pub max_connections: u32,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

/// Sentry settings. Tracking is off when `dsn` is `None`.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parse_or("STOREFRONT_PORT", "8000")?;
        let app_name = env.get_or("STOREFRONT_APP_NAME", "Storefront API");
        let cors_origins = parse_origins(&env.get_or("STOREFRONT_CORS_ORIGINS", DEFAULT_CORS_ORIGINS))
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_CORS_ORIGINS".to_owned(), e))?;
        let request_timeout =
            Duration::from_secs(env.parse_or("STOREFRONT_REQUEST_TIMEOUT_SECS", "30")?);
        let auto_migrate = env.parse_or("STOREFRONT_AUTO_MIGRATE", "false")?;

        let database = DatabaseConfig {
            url: env.database_url("STOREFRONT_DATABASE_URL")?,
            max_connections: env.parse_or("STOREFRONT_DB_MAX_CONNECTIONS", "10")?,
            acquire_timeout: Duration::from_secs(
                env.parse_or("STOREFRONT_DB_ACQUIRE_TIMEOUT_SECS", "10")?,
            ),
            retry: RetryPolicy::with_attempts(env.parse_or("STOREFRONT_DB_RETRY_ATTEMPTS", "3")?),
        };

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        };

        Ok(Self {
            host,
            port,
            app_name,
            cors_origins,
            request_timeout,
            auto_migrate,
            database,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DatabaseConfig {
    /// Load only the database settings, for tools that do not serve HTTP.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is missing or a setting is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        StorefrontConfig::from_lookup(|key| std::env::var(key).ok()).map(|c| c.database)
    }
}

/// Split a comma-separated origin list, skipping blanks.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| format!("invalid origin {origin:?}: {e}"))
        })
        .collect()
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with the lookup helpers used above.
struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_owned())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or(key, default)
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_owned()))
    }
}
