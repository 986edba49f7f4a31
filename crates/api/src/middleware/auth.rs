//! Access-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::errors::ErrorKind;
use moovies_core::error::CoreError;
use moovies_core::types::DbId;

use crate::auth::jwt::verify_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from an ES256 Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Core(CoreError::unauthorized("Token is missing")))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>",
            ))
        })?;

        let claims = verify_access_token(token, &state.config.auth).map_err(|e| {
            // The client distinguishes an elapsed token (silently refresh)
            // from a forged one.
            let err = match e.kind() {
                ErrorKind::ExpiredSignature => {
                    CoreError::unauthorized_kind("TokenExpiredError", "Token has expired")
                }
                _ => CoreError::unauthorized_kind("JsonWebTokenError", "Token is invalid"),
            };
            AppError::Core(err)
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}
