//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use turnstile_core::{UserId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, username, name, gender, age, is_admin, created_at, updated_at";

/// Row shape of the `users` table (without the password hash).
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    name: String,
    gender: String,
    age: i64,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&r.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: r.id,
            username,
            name: r.name,
            gender: r.gender,
            age: r.age,
            is_admin: r.is_admin,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user. New users are never admins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (username, password_hash, name, gender, age, is_admin, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, FALSE, ?6, ?6)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(new_user.username.as_str())
        .bind(&new_user.password_hash)
        .bind(&new_user.name)
        .bind(&new_user.gender)
        .bind(new_user.age)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        User::try_from(row)
    }

    /// Get a user together with their password hash, by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"
        ))
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let user = User::try_from(r.user)?;
        Ok(Some((user, r.password_hash)))
    }

    /// Update a member's display name and gender.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        gender: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET name = ?1, gender = ?2, updated_at = ?3
            WHERE id = ?4
            ",
        )
        .bind(name)
        .bind(gender)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set or clear the admin flag for a username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_admin(&self, username: &Username, is_admin: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET is_admin = ?1, updated_at = ?2
            WHERE username = ?3
            ",
        )
        .bind(is_admin)
        .bind(Utc::now())
        .bind(username.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: Username::parse(username).unwrap(),
            password_hash: "$argon2id$placeholder".to_owned(),
            name: "Ivan".to_owned(),
            gender: "male".to_owned(),
            age: 30,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);

        let created = users.create(&new_user("ivan")).await.unwrap();
        assert!(!created.is_admin);
        assert_eq!(created.age, 30);

        let by_id = users.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username.as_str(), "ivan");
        assert_eq!(by_id.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);

        users.create(&new_user("ivan")).await.unwrap();
        let err = users.create(&new_user("ivan")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_password_hash_lookup() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);
        users.create(&new_user("ivan")).await.unwrap();

        let (user, hash) = users
            .get_password_hash(&Username::parse("ivan").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username.as_str(), "ivan");
        assert_eq!(hash, "$argon2id$placeholder");

        let missing = users
            .get_password_hash(&Username::parse("nobody").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_profile_only_touches_name_and_gender() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);
        let created = users.create(&new_user("ivan")).await.unwrap();

        users
            .update_profile(created.id, "Ivan Petrov", "other")
            .await
            .unwrap();

        let updated = users.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Ivan Petrov");
        assert_eq!(updated.gender, "other");
        assert_eq!(updated.username.as_str(), "ivan");
        assert_eq!(updated.age, 30);
    }

    #[tokio::test]
    async fn test_update_profile_missing_user() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);

        let err = users
            .update_profile(UserId::new(999), "x", "y")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_set_admin() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);
        let created = users.create(&new_user("coach")).await.unwrap();
        let username = Username::parse("coach").unwrap();

        users.set_admin(&username, true).await.unwrap();
        assert!(users.get_by_id(created.id).await.unwrap().unwrap().is_admin);

        users.set_admin(&username, false).await.unwrap();
        assert!(!users.get_by_id(created.id).await.unwrap().unwrap().is_admin);

        let err = users
            .set_admin(&Username::parse("ghost").unwrap(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
