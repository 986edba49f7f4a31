//! Repository for the `password_resets` table.

use moovies_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::password_reset::PasswordReset;

/// Minutes an emailed reset link stays usable. Expiring the row also resets
/// the request quota.
pub const RESET_TTL_MINS: i64 = 30;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, request_count, created_at";

/// Provides operations on password-reset tokens.
pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Find the active (non-expired) reset row for a user, regardless of
    /// token. Used to apply the resend quota.
    pub async fn find_active(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<PasswordReset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM password_resets
             WHERE user_id = $1
               AND created_at > NOW() - INTERVAL '{RESET_TTL_MINS} minutes'"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Start a fresh reset window for a user: new token, count back to zero.
    ///
    /// An expired leftover row is overwritten by the upsert.
    pub async fn upsert_fresh(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
        created_at: Timestamp,
    ) -> Result<PasswordReset, sqlx::Error> {
        let query = format!(
            "INSERT INTO password_resets (user_id, token_hash, created_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE
             SET token_hash = EXCLUDED.token_hash,
                 request_count = 0,
                 created_at = EXCLUDED.created_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(created_at)
            .fetch_one(pool)
            .await
    }

    /// Record a resend inside the current window: replace the token, bump
    /// the count, restart the window.
    pub async fn record_resend(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
        created_at: Timestamp,
    ) -> Result<Option<PasswordReset>, sqlx::Error> {
        let query = format!(
            "UPDATE password_resets
             SET token_hash = $2, request_count = request_count + 1, created_at = $3
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(created_at)
            .fetch_optional(pool)
            .await
    }

    /// Find a non-expired reset row matching user and token hash.
    pub async fn find_valid(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM password_resets
             WHERE user_id = $1
               AND token_hash = $2
               AND created_at > NOW() - INTERVAL '{RESET_TTL_MINS} minutes'"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(user_id)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Delete the reset row for a user. Returns `true` if a row existed.
    pub async fn delete_for_user(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM password_resets WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
