//! Authentication service.
//!
//! Provides registration and username/password login. Passwords are hashed
//! with Argon2id and a per-password random salt.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use turnstile_core::Username;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};
use crate::services::account::{ProfileFields, parse_age};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw registration input as submitted by the form.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub gender: &'a str,
    pub age: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new member.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::InvalidProfile` if name, gender or age are invalid.
    /// Returns `AuthError::UserAlreadyExists` if the username is already registered.
    pub async fn register(&self, input: Registration<'_>) -> Result<User, AuthError> {
        let username = Username::parse(input.username)?;
        validate_password(input.password)?;
        let profile =
            ProfileFields::parse(input.name, input.gender).map_err(AuthError::InvalidProfile)?;
        let age = parse_age(input.age).map_err(AuthError::InvalidProfile)?;

        let password_hash = hash_password(input.password)?;

        let new_user = NewUser {
            username,
            password_hash,
            name: profile.name,
            gender: profile.gender,
            age,
        };

        self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is malformed or
    /// unknown, or the password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    fn registration<'a>(username: &'a str, password: &'a str) -> Registration<'a> {
        Registration {
            username,
            password,
            name: "Anna",
            gender: "female",
            age: "27",
        }
    }

    #[test]
    fn test_hash_is_salted_and_verifiable() {
        let first = hash_password("correct horse").unwrap();
        let second = hash_password("correct horse").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &first).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &first),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_against_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longenough").is_ok());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = memory_pool().await;
        let auth = AuthService::new(&pool);

        let user = auth
            .register(registration("anna", "s3cret-pass"))
            .await
            .unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.age, 27);

        let logged_in = auth.login("anna", "s3cret-pass").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let pool = memory_pool().await;
        let auth = AuthService::new(&pool);
        auth.register(registration("anna", "s3cret-pass"))
            .await
            .unwrap();

        let err = auth.login("anna", "nope-nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_or_malformed_user() {
        let pool = memory_pool().await;
        let auth = AuthService::new(&pool);

        assert!(matches!(
            auth.login("ghost", "whatever1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("", "whatever1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let pool = memory_pool().await;
        let auth = AuthService::new(&pool);
        auth.register(registration("anna", "s3cret-pass"))
            .await
            .unwrap();

        let err = auth
            .register(registration("anna", "other-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(err.form_code(), "username_taken");
    }

    #[tokio::test]
    async fn test_register_rejects_bad_age() {
        let pool = memory_pool().await;
        let auth = AuthService::new(&pool);

        let err = auth
            .register(Registration {
                age: "old",
                ..registration("anna", "s3cret-pass")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidProfile(_)));
    }
}
