//! Refresh-token cookie construction.
//!
//! The raw refresh token travels exclusively in this cookie -- never in a
//! JSON body. `HttpOnly` keeps it away from scripts, `Secure` off plain
//! HTTP, and `SameSite=None` lets the separately-hosted frontend send it on
//! cross-site requests (which is also why CORS runs with credentials).

use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the refresh-token cookie.
pub const REFRESH_COOKIE: &str = "token";

/// Build the refresh cookie with the given lifetime.
///
/// `max_age` is the session TTL: the full window at register/login, the
/// remaining window when a persistent session is refreshed.
pub fn refresh_cookie(token: String, max_age: chrono::Duration) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Build the removal cookie that clears the refresh token client-side.
///
/// Attributes must match [`refresh_cookie`] or browsers keep the original.
pub fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
