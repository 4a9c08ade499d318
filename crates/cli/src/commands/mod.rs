//! CLI subcommand implementations.
//!
//! Every command reads the same environment as the storefront server
//! (`STOREFRONT_DATABASE_URL`, `.env`) and opens its own pool.

pub mod admin;
pub mod migrate;
pub mod products;
pub mod seed;

use sqlx::SqlitePool;
use thiserror::Error;

use turnstile_storefront::config::{ConfigError, StorefrontConfig};
use turnstile_storefront::db::{self, RepositoryError};

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("invalid username: {0}")]
    InvalidUsername(#[from] turnstile_core::UsernameError),

    #[error("no user named '{0}'")]
    UnknownUser(String),
}

/// Load configuration and connect to the storefront database.
async fn connect() -> Result<SqlitePool, CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    Ok(pool)
}
