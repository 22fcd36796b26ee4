//! Opaque bearer tokens.
//!
//! A token is 32 random bytes, hex-encoded, persisted server-side and bound
//! to exactly one user. There is no expiry and no rotation: issuing a token
//! for a user who already holds one returns the existing token.

use rand::RngCore;
use sqlx::SqlitePool;

use crate::error::{Result, ServerError};

/// Hex characters of an issued token.
pub const TOKEN_LENGTH: usize = 64;

/// Handle token rows on database.
#[derive(Clone)]
pub struct TokenRepository {
    pool: SqlitePool,
}

impl TokenRepository {
    /// Create a new [`TokenRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the user's token, creating one on first issuance.
    ///
    /// Must only be called after credential verification.
    pub async fn issue(&self, user_id: i64) -> Result<String> {
        if let Some(token) = sqlx::query_scalar::<_, String>(
            "SELECT token FROM tokens WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        {
            return Ok(token);
        }

        let token = generate();
        sqlx::query("INSERT INTO tokens (token, user_id) VALUES (?, ?)")
            .bind(&token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Resolve a presented bearer token to the owning user id.
    pub async fn authenticate(&self, token: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServerError::Unauthorized)
    }
}

fn generate() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH / 2];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
