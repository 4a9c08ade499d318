//! Seed the default catalog.
//!
//! Pending migrations are applied first, so `turnstile seed` works against a
//! brand new database file.

use sqlx::SqlitePool;
use turnstile_storefront::db::{self, ProductRepository};

use super::{CommandError, connect};

/// Insert the default catalog if the `products` table is empty.
///
/// # Errors
///
/// Returns `CommandError` if the connection, migrations or inserts fail.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let inserted = seed_catalog(&pool).await?;
    if inserted == 0 {
        tracing::info!("Catalog already populated, nothing to seed");
    } else {
        tracing::info!(count = inserted, "Seeded default catalog");
    }

    Ok(())
}

/// Apply migrations, then seed. Returns the number of products inserted.
async fn seed_catalog(pool: &SqlitePool) -> Result<usize, CommandError> {
    db::migrate(pool).await?;
    Ok(ProductRepository::new(pool).seed_defaults().await?)
}
