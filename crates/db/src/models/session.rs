//! User session model and DTOs.

use moovies_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `user_sessions` table: the server-side half of a
/// refresh-token lineage.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    /// SHA-256 hex digest of the current refresh token. The raw token is
    /// never persisted.
    pub refresh_token_hash: String,
    pub is_valid: bool,
    /// Remember-me mode: fixed 7-day ceiling instead of a rolling 30-minute
    /// window.
    pub persist: bool,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// DTO for creating or replacing the single session row of a user.
pub struct UpsertSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub persist: bool,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}
