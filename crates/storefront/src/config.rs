//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `STOREFRONT_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `STOREFRONT_SESSION_TTL_HOURS` - Session inactivity expiry (default: 168)
//! - `STOREFRONT_CATALOG_EDIT_POLICY` - `open` or `admin` (default: open)
//! - `STOREFRONT_CURRENCY` - Display currency (default: RUB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0 / 0.0)

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use turnstile_core::CurrencyCode;
use url::Url;

const DEFAULT_SESSION_TTL_HOURS: u64 = 7 * 24;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Who may use the catalog edit routes (`/menu/edit/{id}`, `/menu/update_stock/{id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogEditPolicy {
    /// Anyone reaching the route may edit, logged in or not.
    #[default]
    Open,
    /// Only a logged-in user with the admin flag may edit.
    AdminOnly,
}

impl FromStr for CatalogEditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "admin" | "admin_only" => Ok(Self::AdminOnly),
            other => Err(format!("expected 'open' or 'admin', got '{other}'")),
        }
    }
}

impl fmt::Display for CatalogEditPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::AdminOnly => f.write_str("admin"),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session inactivity expiry
    pub session_ttl: Duration,
    /// Permission rule for catalog edits
    pub catalog_edit_policy: CatalogEditPolicy,
    /// Currency used when rendering prices
    pub currency: CurrencyCode,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when absent
    pub dsn: Option<String>,
    /// Environment tag (e.g. "production")
    pub environment: Option<String>,
    /// Error event sample rate (0.0 - 1.0)
    pub sample_rate: f32,
    /// Performance trace sample rate (0.0 - 1.0)
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
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

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required keys are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(&lookup);

        let database_url = env
            .get("STOREFRONT_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;

        let db_max_connections: u32 = env.parse_or("STOREFRONT_DB_MAX_CONNECTIONS", 5)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let host: IpAddr = env.parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port: u16 = env.parse_or("STOREFRONT_PORT", 3000)?;

        let base_url = env
            .get("STOREFRONT_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let ttl_hours: u64 =
            env.parse_or("STOREFRONT_SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        if ttl_hours == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_SESSION_TTL_HOURS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let session_ttl_secs = ttl_hours.checked_mul(60 * 60).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "STOREFRONT_SESSION_TTL_HOURS".to_string(),
                "is too large".to_string(),
            )
        })?;

        let catalog_edit_policy =
            env.parse_or("STOREFRONT_CATALOG_EDIT_POLICY", CatalogEditPolicy::Open)?;
        let currency = env.parse_or("STOREFRONT_CURRENCY", CurrencyCode::RUB)?;

        let sentry = SentryConfig {
            dsn: env.get("SENTRY_DSN"),
            environment: env.get("SENTRY_ENVIRONMENT"),
            sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        };

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            base_url,
            session_ttl: Duration::from_secs(session_ttl_secs),
            catalog_edit_policy,
            currency,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (decides the `Secure` cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Thin wrapper over a key lookup with typed parsing.
struct Lookup<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Lookup<'_, F> {
    /// Get a non-empty value.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a value, or fall back to a default when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}
