//! # User Repository
//!
//! Login account storage. Rows carry argon2 password hashes, never
//! plaintext; hashing and verification happen in the server's auth layer.
//!
//! User accounts are server-internal, so this repository does not publish
//! change events.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stylestock_core::User;

/// Repository for user account database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks up a user by username (the login identifier).
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, display_name, role, created_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new account.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username already taken
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(username = %user.username, role = ?user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, display_name, role, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts accounts. Zero means the server should bootstrap defaults.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
