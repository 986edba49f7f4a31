//! Email-verification token model.

use moovies_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `email_verifications` table. At most one per user.
#[derive(Debug, Clone, FromRow)]
pub struct EmailVerification {
    pub id: DbId,
    pub user_id: DbId,
    /// SHA-256 hex digest of the emailed token.
    pub token_hash: String,
    pub created_at: Timestamp,
}
