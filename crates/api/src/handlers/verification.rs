//! Handlers for the email-verification flow.

use axum::extract::{Query, State};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use moovies_core::error::CoreError;
use moovies_core::tokens::{generate_token, hash_token};
use moovies_core::types::DbId;
use moovies_db::models::user::User;
use moovies_db::repositories::{UserRepo, VerificationRepo};
use moovies_mailer::MailKind;
use serde::Deserialize;

use crate::auth::cookie::REFRESH_COOKIE;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Query parameters of the emailed verification link.
#[derive(Debug, Deserialize)]
pub struct VerificationQuery {
    pub user: DbId,
    pub token: String,
}

/// Request body for `POST /auth/verification/resend`.
#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub id: DbId,
}

/// GET /api/v1/auth/verification?user=&token=
///
/// Validate the emailed link and mark the account verified.
pub async fn verify(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<VerificationQuery>,
) -> AppResult<Json<MessageResponse>> {
    let user = UserRepo::find_by_id(&state.pool, query.user)
        .await?
        .ok_or_else(|| {
            CoreError::unauthorized("Credentials are wrong. Please sign in and request a new code.")
        })?;

    if user.is_verified {
        return Err(AppError::Core(CoreError::conflict(
            "Your account has already been verified.",
        )));
    }

    // The row stores only the token digest; an expired or replaced token
    // simply fails to match.
    VerificationRepo::find_valid(&state.pool, user.id, &hash_token(&query.token))
        .await?
        .ok_or_else(|| {
            CoreError::unauthorized(
                "Your verification code has expired. Please click the resend button to get a new code.",
            )
        })?;

    UserRepo::mark_verified(&state.pool, user.id).await?;
    VerificationRepo::delete_for_user(&state.pool, user.id).await?;

    // With a refresh cookie present the client hits refresh next and is
    // signed in automatically; without one it must sign in by hand.
    let message = if jar.get(REFRESH_COOKIE).is_some() {
        "Your account has been verified."
    } else {
        "Your account has been verified. Please sign in."
    };

    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/v1/auth/verification/resend
///
/// Replace the pending verification token and send a fresh link.
pub async fn resend(
    State(state): State<AppState>,
    AppJson(input): AppJson<ResendRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = UserRepo::find_by_id(&state.pool, input.id)
        .await?
        .ok_or_else(|| CoreError::unauthorized("Credentials are wrong"))?;

    if user.is_verified {
        return Err(AppError::Core(CoreError::conflict(
            "Your account has already been verified.",
        )));
    }

    let verification = generate_token();
    VerificationRepo::upsert_for_user(&state.pool, user.id, &verification.hash, Utc::now())
        .await?;

    send_verification_email(&state, &user, &verification.plaintext);

    Ok(Json(MessageResponse::new(
        "We have sent an email to your address with a verification link, please also check the spam folder.",
    )))
}

/// Dispatch the verification email without blocking or failing the caller.
///
/// The primary side effects (user + verification row) are already
/// persisted; a failed send is logged and the client keeps its success
/// response.
pub(crate) fn send_verification_email(state: &AppState, user: &User, token: &str) {
    let Some(mailer) = state.mailer.clone() else {
        tracing::warn!(user_id = user.id, "SMTP not configured; skipping verification email");
        return;
    };

    let link = format!(
        "{}/auth/verification?user={}&token={}",
        state.config.public_origin, user.id, token
    );
    let text = format!(
        "Hello {},\n\n\
         Please verify your account by copying and pasting the following link into your browser:\n\
         {}\n\n\
         Link expires after 24 hours, in that case you need to resend a new link.\n\n\
         Thank You!",
        user.username, link
    );
    let to = user.email.clone();

    tokio::spawn(async move {
        if let Err(e) = mailer
            .send(&to, "Verify your email", text, MailKind::Verification, &link)
            .await
        {
            tracing::error!(error = %e, to = %to, "Failed to send verification email");
        }
    });
}
