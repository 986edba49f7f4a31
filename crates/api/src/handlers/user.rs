//! Handlers for the `/user` resource (account settings).
//!
//! Every route requires a valid access token, and the path id must match the
//! token subject -- a token for one account never operates on another.

use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use moovies_core::error::CoreError;
use moovies_core::types::DbId;
use moovies_core::validation;
use moovies_db::models::user::UserSettings;
use moovies_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;

use crate::auth::cookie::{clear_refresh_cookie, REFRESH_COOKIE};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Request body for `PATCH /user/{id}/settings/username`.
#[derive(Debug, Deserialize)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

/// Request body for `PATCH /user/{id}/settings/password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub new_password: String,
}

/// Request body for `DELETE /user/{id}`.
#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// GET /api/v1/user/{id}/settings
pub async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserSettings>> {
    require_self(id, &auth)?;

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::internal("Something went wrong."))?;

    Ok(Json(UserSettings::from(&user)))
}

/// PATCH /api/v1/user/{id}/settings/username
pub async fn update_username(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateUsernameRequest>,
) -> AppResult<Json<MessageResponse>> {
    require_self(id, &auth)?;
    validation::validate_username(&input.username)?;

    if UserRepo::find_by_username_ci(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::conflict_field(
            "Duplicate values encountered",
            "username",
            "Username already exists",
        )));
    }

    UserRepo::update_username(&state.pool, id, &input.username).await?;

    Ok(Json(MessageResponse::new("Username updated successfully")))
}

/// PATCH /api/v1/user/{id}/settings/password
pub async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    require_self(id, &auth)?;

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::internal("Something went wrong."))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::unauthorized(
            "Password is not correct.",
        )));
    }

    validation::validate_password(&input.new_password)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, id, &password_hash).await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// DELETE /api/v1/user/{id}
///
/// Delete the account after re-confirming the password. The session row is
/// removed explicitly (and the cookie cleared) before the user row cascades
/// the remaining token rows away.
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<DeleteAccountRequest>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    require_self(id, &auth)?;

    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::unauthorized("Credentials are wrong"))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::unauthorized(
            "Password is not correct.",
        )));
    }

    SessionRepo::delete_for_user(&state.pool, id).await?;
    UserRepo::delete(&state.pool, id).await?;

    let jar = if jar.get(REFRESH_COOKIE).is_some() {
        jar.remove(clear_refresh_cookie())
    } else {
        jar
    };

    Ok((jar, Json(MessageResponse::new("Account deleted successfully"))))
}

/// Reject any request whose path id does not match the authenticated user.
fn require_self(id: DbId, auth: &AuthUser) -> Result<(), AppError> {
    if id != auth.user_id {
        return Err(AppError::Core(CoreError::unauthorized(
            "Credentials are wrong.",
        )));
    }
    Ok(())
}
