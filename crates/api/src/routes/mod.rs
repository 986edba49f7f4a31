pub mod auth;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/refresh                  refresh (cookie)
/// /auth/logout                   logout
/// /auth/verification             verify emailed link
/// /auth/verification/resend      resend verification email
/// /auth/password/resend          request password-reset email
/// /auth/password/validation      validate link (GET) / set password (POST)
///
/// /user/{id}/settings            account settings (requires auth)
/// /user/{id}/settings/username   change username
/// /user/{id}/settings/password   change password
/// /user/{id}                     delete account
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/user", user::router())
}
