//! Opaque account-token generation and digest computation.
//!
//! Refresh, email-verification, and password-reset tokens are all opaque
//! random values. The plaintext goes to the client exactly once (cookie or
//! email link); only the SHA-256 digest is persisted, so a database leak
//! never yields a usable token.

use rand::RngCore;

/// Number of random bytes in a generated token (512 bits of entropy).
pub const TOKEN_BYTES: usize = 64;

/// The result of generating a new opaque token.
pub struct GeneratedToken {
    /// Hex-encoded plaintext, sent to the client and never stored.
    pub plaintext: String,
    /// SHA-256 hex digest of the plaintext, the store lookup key.
    pub hash: String,
}

/// Generate a new cryptographically random token.
///
/// The plaintext is a fixed-length 128-character hex string. Hashing the
/// same plaintext again always reproduces `hash`, which is what makes the
/// digest usable as a lookup key.
pub fn generate_token() -> GeneratedToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    let plaintext: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let hash = hash_token(&plaintext);

    GeneratedToken { plaintext, hash }
}

/// Compute the SHA-256 hex digest of a token.
///
/// Used both at issue time (to store the digest) and at presentation time
/// (to look the token up by digest).
pub fn hash_token(token: &str) -> String {
    crate::hashing::sha256_hex(token.as_bytes())
}
