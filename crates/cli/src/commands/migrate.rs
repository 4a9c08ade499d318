//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded into
//! the storefront crate. The session table is owned by the session store and
//! is created alongside them.

use turnstile_storefront::{db, middleware};

use super::{CommandError, connect};

/// Run all pending migrations and create the session table.
///
/// # Errors
///
/// Returns `CommandError` if the connection or any migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    db::migrate(&pool).await?;
    middleware::migrate_session_store(&pool).await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}
