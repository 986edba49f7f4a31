//! Handlers for the password-reset flow.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use moovies_core::error::CoreError;
use moovies_core::tokens::{generate_token, hash_token};
use moovies_core::types::DbId;
use moovies_core::validation;
use moovies_db::models::user::User;
use moovies_db::repositories::{PasswordResetRepo, UserRepo};
use moovies_mailer::MailKind;
use serde::Deserialize;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Resends allowed inside one reset window after the initial email; the
/// request after this count is rejected with 403.
const MAX_RESET_RESENDS: i32 = 2;

/// Request body for `POST /auth/password/resend`.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// Query parameters of the emailed reset link.
#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub user: DbId,
    pub token: String,
}

/// Request body for `POST /auth/password/validation`.
#[derive(Debug, Deserialize)]
pub struct NewPasswordRequest {
    pub password: Option<String>,
}

/// POST /api/v1/auth/password/resend
///
/// Email a reset link, enforcing the per-window request quota.
pub async fn request_reset(
    State(state): State<AppState>,
    AppJson(input): AppJson<ResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    // Unlike login, this endpoint confirms address existence on purpose:
    // the user is recovering an account they claim is theirs.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| CoreError::not_found("The email you provided is not correct"))?;

    let reset = generate_token();
    let now = Utc::now();

    match PasswordResetRepo::find_active(&state.pool, user.id).await? {
        Some(row) if row.request_count >= MAX_RESET_RESENDS => {
            return Err(AppError::Core(CoreError::forbidden(
                "You have exceeded the allowed number of requests permitted for this service. Try again later.",
            )));
        }
        Some(_) => {
            PasswordResetRepo::record_resend(&state.pool, user.id, &reset.hash, now)
                .await?
                .ok_or_else(|| CoreError::internal("Something went wrong, please try again"))?;
        }
        None => {
            PasswordResetRepo::upsert_fresh(&state.pool, user.id, &reset.hash, now).await?;
        }
    }

    send_reset_email(&state, &user, &reset.plaintext);

    Ok(Json(MessageResponse::new(
        "We have sent an email to your address with a reset link, please check the spam folder",
    )))
}

/// GET /api/v1/auth/password/validation?user=&token=
///
/// Pre-validate the emailed link so the client can show the new-password
/// form only for live links.
pub async fn validate_link(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> AppResult<Json<MessageResponse>> {
    PasswordResetRepo::find_valid(&state.pool, query.user, &hash_token(&query.token))
        .await?
        .ok_or_else(|| {
            CoreError::unauthorized("Your link has expired, please request a new one.")
        })?;

    Ok(Json(MessageResponse::new(
        "Your link is correct, proceed in resetting your password.",
    )))
}

/// POST /api/v1/auth/password/validation?user=&token=
///
/// Set the new password and consume the reset token.
pub async fn reset(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
    AppJson(input): AppJson<NewPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let password = input
        .password
        .ok_or_else(|| CoreError::bad_request("Password field is required"))?;

    validation::validate_password(&password)?;

    PasswordResetRepo::find_valid(&state.pool, query.user, &hash_token(&query.token))
        .await?
        .ok_or_else(|| {
            CoreError::unauthorized("Your link has expired, please request a new one and try again.")
        })?;

    let user = UserRepo::find_by_id(&state.pool, query.user)
        .await?
        .ok_or_else(|| CoreError::unauthorized("Credentials are wrong"))?;

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    PasswordResetRepo::delete_for_user(&state.pool, user.id).await?;

    Ok(Json(MessageResponse::new(
        "Your password has been reset successfully",
    )))
}

/// Dispatch the reset email without blocking or failing the caller.
fn send_reset_email(state: &AppState, user: &User, token: &str) {
    let Some(mailer) = state.mailer.clone() else {
        tracing::warn!(user_id = user.id, "SMTP not configured; skipping password reset email");
        return;
    };

    let link = format!(
        "{}/auth/password/validation?user={}&token={}",
        state.config.public_origin, user.id, token
    );
    let text = format!(
        "Hello {},\n\n\
         You can reset your password by copying and pasting the following link into your browser:\n\
         {}\n\n\
         Link expires after 30 minutes, in that case you need to resend a new link.\n\n\
         Thank You!",
        user.username, link
    );
    let to = user.email.clone();

    tokio::spawn(async move {
        if let Err(e) = mailer
            .send(&to, "Reset your password", text, MailKind::PasswordReset, &link)
            .await
        {
            tracing::error!(error = %e, to = %to, "Failed to send password reset email");
        }
    });
}
