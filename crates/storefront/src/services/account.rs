//! Member account service: profile edits and purchase history.
//!
//! Only the display name and gender are editable here. Username, password and
//! age are fixed at registration.

use sqlx::SqlitePool;
use thiserror::Error;

use turnstile_core::UserId;

use crate::db::{PurchaseRepository, RepositoryError, UserRepository};
use crate::models::{PurchaseSummary, User};

const MAX_NAME_LENGTH: usize = 100;
const MAX_GENDER_LENGTH: usize = 32;
const MAX_AGE: i64 = 150;

/// Errors from account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The session refers to a user row that no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Submitted profile fields failed validation.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validated, trimmed display name and gender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: String,
    pub gender: String,
}

impl ProfileFields {
    /// Trim and validate the editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message if either field is empty or too long.
    pub fn parse(name: &str, gender: &str) -> Result<Self, String> {
        let name = name.trim();
        let gender = gender.trim();

        if name.is_empty() {
            return Err("name cannot be empty".to_owned());
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(format!("name must be at most {MAX_NAME_LENGTH} characters"));
        }
        if gender.is_empty() {
            return Err("gender cannot be empty".to_owned());
        }
        if gender.chars().count() > MAX_GENDER_LENGTH {
            return Err(format!(
                "gender must be at most {MAX_GENDER_LENGTH} characters"
            ));
        }

        Ok(Self {
            name: name.to_owned(),
            gender: gender.to_owned(),
        })
    }
}

/// Parse an age in whole years.
///
/// # Errors
///
/// Returns a human-readable message if the input is not an integer in `0..=150`.
pub fn parse_age(input: &str) -> Result<i64, String> {
    let age: i64 = input
        .trim()
        .parse()
        .map_err(|_| format!("age must be a whole number, got '{}'", input.trim()))?;

    if !(0..=MAX_AGE).contains(&age) {
        return Err(format!("age must be between 0 and {MAX_AGE}"));
    }

    Ok(age)
}

/// Account service.
pub struct AccountService<'a> {
    users: UserRepository<'a>,
    purchases: PurchaseRepository<'a>,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
            purchases: PurchaseRepository::new(pool),
        }
    }

    /// Load a member and their purchase history.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the user doesn't exist.
    pub async fn profile(
        &self,
        user_id: UserId,
    ) -> Result<(User, Vec<PurchaseSummary>), AccountError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;
        let history = self.purchases.list_for_user(user_id).await?;

        Ok((user, history))
    }

    /// Update a member's display name and gender.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidProfile` if validation fails.
    /// Returns `AccountError::UserNotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: &str,
        gender: &str,
    ) -> Result<(), AccountError> {
        let fields = ProfileFields::parse(name, gender).map_err(AccountError::InvalidProfile)?;

        self.users
            .update_profile(user_id, &fields.name, &fields.gender)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AccountError::UserNotFound,
                other => AccountError::Repository(other),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use turnstile_core::Username;

    use super::*;
    use crate::db::test_support::memory_pool;
    use crate::models::NewUser;

    #[test]
    fn test_profile_fields_trim() {
        let fields = ProfileFields::parse("  Olga ", " female ").unwrap();
        assert_eq!(fields.name, "Olga");
        assert_eq!(fields.gender, "female");
    }

    #[test]
    fn test_profile_fields_reject_empty() {
        assert!(ProfileFields::parse("", "male").is_err());
        assert!(ProfileFields::parse("Olga", "  ").is_err());
    }

    #[test]
    fn test_profile_fields_reject_long_name() {
        let long = "n".repeat(MAX_NAME_LENGTH + 1);
        assert!(ProfileFields::parse(&long, "male").is_err());
    }

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age(" 18 ").unwrap(), 18);
        assert_eq!(parse_age("0").unwrap(), 0);
        assert!(parse_age("-1").is_err());
        assert!(parse_age("151").is_err());
        assert!(parse_age("eighteen").is_err());
    }

    #[tokio::test]
    async fn test_update_profile_missing_user() {
        let pool = memory_pool().await;
        let err = AccountService::new(&pool)
            .update_profile(UserId::new(404), "Name", "male")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound));
    }

    #[tokio::test]
    async fn test_profile_includes_empty_history() {
        let pool = memory_pool().await;
        let user = UserRepository::new(&pool)
            .create(&NewUser {
                username: Username::parse("olga").unwrap(),
                password_hash: "hash".to_owned(),
                name: "Olga".to_owned(),
                gender: "female".to_owned(),
                age: 40,
            })
            .await
            .unwrap();

        let (loaded, history) = AccountService::new(&pool).profile(user.id).await.unwrap();
        assert_eq!(loaded.name, "Olga");
        assert!(history.is_empty());
    }
}
