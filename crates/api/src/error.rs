use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use moovies_core::error::{CoreError, FieldDetail};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the service's standard
/// `{status, error, message, details}` JSON error body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `moovies_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An internal error with a message that is logged, not sent to the
    /// client.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message, details) = match &self {
            AppError::Core(core) => {
                let status = match core {
                    CoreError::BadRequest { .. } => StatusCode::BAD_REQUEST,
                    CoreError::Unauthorized { .. } | CoreError::SessionExpired { .. } => {
                        StatusCode::UNAUTHORIZED
                    }
                    CoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
                    CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                    CoreError::Conflict { .. } => StatusCode::CONFLICT,
                    CoreError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    CoreError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %core, "Internal core error");
                }
                // Internal messages here are crafted user-facing text
                // ("Something went wrong, ..."), so they pass through.
                let message = match core {
                    CoreError::BadRequest { message, .. }
                    | CoreError::Unauthorized { message, .. }
                    | CoreError::SessionExpired { message }
                    | CoreError::Forbidden { message }
                    | CoreError::NotFound { message }
                    | CoreError::Conflict { message, .. }
                    | CoreError::UnprocessableEntity { message, .. }
                    | CoreError::Internal { message } => message.clone(),
                };
                (status, core.kind(), message, core.details().to_vec())
            }

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Something went wrong".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = json!({
            "status": status.as_u16(),
            "error": kind,
            "message": message,
            "details": details,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into a status, error kind, message, and details.
///
/// Unique constraint violations (PostgreSQL error 23505) map to 409 with a
/// single field-level detail when the constraint is one of ours (`uq_`
/// prefix). Everything else maps to 500 with a sanitized message. Only one
/// conflicting field is ever reported, even if several unique constraints
/// would be violated -- matching how the product behaves elsewhere.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String, Vec<FieldDetail>) {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                let details = match constraint {
                    "uq_users_email" => vec![FieldDetail::new("email", "Email already exists.")],
                    "uq_users_username_lower" => {
                        vec![FieldDetail::new("username", "Username already exists.")]
                    }
                    _ => Vec::new(),
                };
                return (
                    StatusCode::CONFLICT,
                    "Conflict",
                    "Duplicate values encountered".to_string(),
                    details,
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "InternalServerError",
        "Something went wrong".to_string(),
        Vec::new(),
    )
}
