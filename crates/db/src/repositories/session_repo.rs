//! Repository for the `user_sessions` table.
//!
//! The table holds at most one row per user (`uq_user_sessions_user_id`),
//! so every login is an atomic create-or-replace and every refresh is a
//! single conditional update on the previous token hash. No process-level
//! locking exists anywhere above this layer; these statements ARE the
//! synchronization.

use moovies_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{Session, UpsertSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, refresh_token_hash, is_valid, persist, created_at, expires_at";

/// Provides operations on user sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Create or replace the session row for a user.
    ///
    /// `ON CONFLICT (user_id) DO UPDATE` guarantees one row per user: a
    /// second login overwrites the hash, persistence mode, and timestamps,
    /// and revalidates the row, displacing any session held by another
    /// device.
    pub async fn upsert_for_user(
        pool: &PgPool,
        input: &UpsertSession,
    ) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, persist, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id) DO UPDATE
             SET refresh_token_hash = EXCLUDED.refresh_token_hash,
                 persist = EXCLUDED.persist,
                 is_valid = TRUE,
                 created_at = EXCLUDED.created_at,
                 expires_at = EXCLUDED.expires_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.persist)
            .bind(input.created_at)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its refresh token hash.
    ///
    /// No validity or expiry filtering here: the caller distinguishes an
    /// absent session (generic credential failure) from a present-but-dead
    /// one (session-expired failure).
    pub async fn find_by_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE refresh_token_hash = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Find the session owned by a user.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE user_id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Rotate a session's refresh token with a compare-and-swap on the
    /// previous hash.
    ///
    /// Returns the updated row, or `None` when no valid session holds
    /// `old_hash` anymore -- a concurrent refresh already consumed it and
    /// exactly one of the racing callers wins. Callers pass the existing
    /// `created_at`/`expires_at` to keep a persistent session's original
    /// ceiling, or fresh values to slide a short session's window.
    pub async fn rotate(
        pool: &PgPool,
        old_hash: &str,
        new_hash: &str,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions
             SET refresh_token_hash = $2, created_at = $3, expires_at = $4
             WHERE refresh_token_hash = $1 AND is_valid = TRUE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(old_hash)
            .bind(new_hash)
            .bind(created_at)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Invalidate the session holding the given token hash.
    ///
    /// Returns `true` if a row matched. An already-invalid row still counts
    /// as a match, keeping logout idempotent for the user while an absent
    /// row stays observable to the caller.
    pub async fn invalidate_by_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE user_sessions SET is_valid = FALSE WHERE refresh_token_hash = $1")
                .bind(hash)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Invalidate the session owned by a user. Returns `true` if a row
    /// matched.
    pub async fn invalidate_by_user(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE user_sessions SET is_valid = FALSE WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the session owned by a user. Used on account deletion.
    pub async fn delete_for_user(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
