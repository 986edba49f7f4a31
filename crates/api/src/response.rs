//! Shared response types for API handlers.

use serde::Serialize;

/// Standard `{ "message": ... }` body for operations whose only output is a
/// human-readable confirmation.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
