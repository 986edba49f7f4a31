//! Repository for the `email_verifications` table.

use moovies_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::verification::EmailVerification;

/// Hours an emailed verification link stays usable.
pub const VERIFICATION_TTL_HOURS: i64 = 24;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, created_at";

/// Provides operations on email-verification tokens.
pub struct VerificationRepo;

impl VerificationRepo {
    /// Create or replace the verification row for a user.
    ///
    /// Resending a code overwrites the previous token and restarts the
    /// 24-hour window.
    pub async fn upsert_for_user(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
        created_at: Timestamp,
    ) -> Result<EmailVerification, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_verifications (user_id, token_hash, created_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE
             SET token_hash = EXCLUDED.token_hash,
                 created_at = EXCLUDED.created_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a non-expired verification row matching user and token hash.
    pub async fn find_valid(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<Option<EmailVerification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_verifications
             WHERE user_id = $1
               AND token_hash = $2
               AND created_at > NOW() - INTERVAL '{VERIFICATION_TTL_HOURS} hours'"
        );
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(user_id)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Delete the verification row for a user. Returns `true` if a row
    /// existed.
    pub async fn delete_for_user(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM email_verifications WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
