//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, password_reset, verification};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register                  -> register
/// POST /login                     -> login
/// GET  /refresh                   -> refresh (cookie only)
/// POST /logout                    -> logout
/// GET  /verification              -> verify emailed link
/// POST /verification/resend       -> resend verification email
/// POST /password/resend           -> request reset email
/// GET  /password/validation       -> pre-validate reset link
/// POST /password/validation       -> set new password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", get(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/verification", get(verification::verify))
        .route("/verification/resend", post(verification::resend))
        .route("/password/resend", post(password_reset::request_reset))
        .route(
            "/password/validation",
            get(password_reset::validate_link).post(password_reset::reset),
        )
}
