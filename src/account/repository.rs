//! Repository layer for user accounts

use sqlx::{PgExecutor, PgPool};

use super::models::{User, UserCredentials};
use crate::core_types::UserId;

/// User repository for CRUD operations
pub struct UserRepository;

impl UserRepository {
    /// Get user by ID
    pub async fn get_by_id(pool: &PgPool, user_id: UserId) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT user_id, username, email, is_active, created_at
               FROM users WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Whether a user row exists
    ///
    /// Takes any executor so it can run inside a ledger unit of work.
    pub async fn exists<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: UserId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(executor)
            .await
    }

    /// Get login credentials by email
    pub async fn get_credentials_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        sqlx::query_as::<_, UserCredentials>(
            r#"SELECT user_id, username, email, password_hash, is_active
               FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Create a new user, returning its ID
    pub async fn create(
        pool: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserId, sqlx::Error> {
        sqlx::query_scalar::<_, UserId>(
            r#"INSERT INTO users (username, email, password_hash)
               VALUES ($1, $2, $3) RETURNING user_id"#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await
    }
}
