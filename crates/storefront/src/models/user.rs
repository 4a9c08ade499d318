//! User domain types.

use chrono::{DateTime, Utc};

use turnstile_core::{UserId, Username};

/// A storefront member (domain type).
///
/// The password hash is not part of this type; it is only read during login
/// through [`crate::db::users::UserRepository::get_password_hash`].
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Display name.
    pub name: String,
    /// Free-form gender as entered by the member.
    pub gender: String,
    /// Age in years, fixed at registration.
    pub age: i64,
    /// Whether the member may edit the catalog under the `admin` policy.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
    pub name: String,
    pub gender: String,
    pub age: i64,
}
