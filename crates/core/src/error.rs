//! Domain error taxonomy.
//!
//! Every error carries a machine-readable kind (see [`CoreError::kind`]), a
//! human-readable message, and optionally a list of field-level
//! [`FieldDetail`] objects. The API layer translates these into the
//! `{status, error, message, details}` JSON body.

use serde::Serialize;

/// A single field-level problem attached to a validation or conflict error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDetail {
    pub field: String,
    pub message: String,
}

impl FieldDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or structurally malformed input (HTTP 400).
    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        details: Vec<FieldDetail>,
    },

    /// Bad credentials or a missing/invalid token (HTTP 401). The `kind`
    /// distinguishes cookie problems from generic credential failures
    /// without changing the status code.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        kind: &'static str,
        message: String,
    },

    /// A real but dead credential: the session exists and is expired or has
    /// been invalidated (HTTP 401, distinct kind so clients can redirect to
    /// login instead of showing a generic error).
    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    /// Quota or permission failure (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Entity lookup by caller-supplied identifier failed (HTTP 404).
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// A unique-field collision (HTTP 409).
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        details: Vec<FieldDetail>,
    },

    /// Well-formed but semantically invalid input (HTTP 422).
    #[error("Unprocessable: {message}")]
    UnprocessableEntity {
        message: String,
        details: Vec<FieldDetail>,
    },

    /// Unexpected failure; the message is logged, never sent verbatim to the
    /// client (HTTP 500).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn bad_request_field(
        message: impl Into<String>,
        field: impl Into<String>,
        field_message: impl Into<String>,
    ) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: vec![FieldDetail::new(field, field_message)],
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            kind: "Unauthorized",
            message: message.into(),
        }
    }

    /// Unauthorized with an overridden machine-readable kind, e.g.
    /// `"CookieError"` when the refresh cookie is missing.
    pub fn unauthorized_kind(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            kind,
            message: message.into(),
        }
    }

    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::SessionExpired {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn conflict_field(
        message: impl Into<String>,
        field: impl Into<String>,
        field_message: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            message: message.into(),
            details: vec![FieldDetail::new(field, field_message)],
        }
    }

    pub fn unprocessable(message: impl Into<String>, details: Vec<FieldDetail>) -> Self {
        Self::UnprocessableEntity {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Machine-readable error name rendered into the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "BadRequest",
            Self::Unauthorized { kind, .. } => *kind,
            Self::SessionExpired { .. } => "TokenExpiredError",
            Self::Forbidden { .. } => "Forbidden",
            Self::NotFound { .. } => "NotFound",
            Self::Conflict { .. } => "Conflict",
            Self::UnprocessableEntity { .. } => "UnprocessableEntity",
            Self::Internal { .. } => "InternalServerError",
        }
    }

    /// Field-level details, empty for variants that carry none.
    pub fn details(&self) -> &[FieldDetail] {
        match self {
            Self::BadRequest { details, .. }
            | Self::Conflict { details, .. }
            | Self::UnprocessableEntity { details, .. } => details,
            _ => &[],
        }
    }
}
