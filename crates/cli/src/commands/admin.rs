//! Admin flag management.
//!
//! The storefront never grants admin rights itself; this is the only way to
//! obtain an account that passes the `admin` catalog edit policy.
//!
//! # Usage
//!
//! ```bash
//! turnstile admin grant coach
//! turnstile admin revoke coach
//! ```

use turnstile_core::Username;
use turnstile_storefront::db::{RepositoryError, UserRepository};

use super::{CommandError, connect};

/// Set or clear the admin flag on an existing member.
///
/// # Errors
///
/// Returns `CommandError::UnknownUser` if no member has this username.
pub async fn set_admin(username: &str, is_admin: bool) -> Result<(), CommandError> {
    let username = Username::parse(username)?;
    let pool = connect().await?;

    UserRepository::new(&pool)
        .set_admin(&username, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::UnknownUser(username.to_string()),
            other => CommandError::Repository(other),
        })?;

    if is_admin {
        tracing::info!(%username, "Admin rights granted");
    } else {
        tracing::info!(%username, "Admin rights revoked");
    }

    Ok(())
}
