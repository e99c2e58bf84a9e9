//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use grail_core::types::{DbId, Timestamp};

/// A row from the `users` table.
///
/// `api_key_hash` is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub api_key_hash: Option<String>,
    pub api_key_prefix: Option<String>,
    pub last_sync_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
}

/// Response returned when an API key is (re)issued.
/// Includes the plaintext key, shown exactly once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyIssuedResponse {
    pub key_prefix: String,
    pub plaintext_key: String,
}
