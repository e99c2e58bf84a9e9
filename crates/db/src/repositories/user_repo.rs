//! Repository for the `users` table.

use grail_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, api_key_hash, api_key_prefix, \
                        last_sync_at, created_at, updated_at";

/// Provides the user operations the sync path needs.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    /// Find the user owning an API key, by the key's SHA-256 hash.
    pub async fn find_by_api_key_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE api_key_hash = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(key_hash)
            .fetch_optional(pool)
            .await
    }

    /// Replace the user's API key. Any previous key stops working immediately.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_api_key(
        pool: &PgPool,
        id: DbId,
        key_hash: &str,
        key_prefix: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET api_key_hash = $2, api_key_prefix = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(key_hash)
            .bind(key_prefix)
            .fetch_optional(pool)
            .await
    }

    /// Take a row lock on the user for the rest of the transaction.
    ///
    /// Serializes concurrent syncs for the same user. Returns `false` if the
    /// user does not exist.
    pub async fn lock_for_sync(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(row.is_some())
    }

    /// Stamp the time of the user's most recent successful sync.
    pub async fn touch_last_sync(
        conn: &mut PgConnection,
        id: DbId,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_sync_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(conn)
            .await?;
        Ok(())
    }
}
