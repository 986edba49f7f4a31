//! Shared domain building blocks for the moovies backend.
//!
//! This crate has no knowledge of HTTP or the database; it holds the error
//! taxonomy, primitive type aliases, and the token/validation primitives
//! used by both the repository layer and the API layer.

pub mod error;
pub mod hashing;
pub mod tokens;
pub mod types;
pub mod validation;

pub use error::{CoreError, FieldDetail};
pub use tokens::{generate_token, hash_token, GeneratedToken};
