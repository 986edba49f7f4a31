//! Password-reset token model.

use moovies_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `password_resets` table. At most one per user.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: DbId,
    pub user_id: DbId,
    /// SHA-256 hex digest of the emailed token.
    pub token_hash: String,
    /// Number of resend requests inside the current window, starting at 0
    /// for the initial send.
    pub request_count: i32,
    pub created_at: Timestamp,
}
