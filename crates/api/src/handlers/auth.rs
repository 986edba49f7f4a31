//! Handlers for the `/auth` resource (register, login, refresh, logout).
//!
//! This is the refresh-token state machine: a lineage goes Absent -> Active
//! on register/login, rotates in place on every refresh, and ends at
//! Invalidated (logout), Expired (time), or Deleted (account removal). A new
//! login always starts a fresh lineage by overwriting the session row.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{Duration, Utc};
use moovies_core::error::CoreError;
use moovies_core::tokens::{generate_token, hash_token};
use moovies_core::types::DbId;
use moovies_core::validation;
use moovies_db::models::session::UpsertSession;
use moovies_db::models::user::{CreateUser, User};
use moovies_db::repositories::{SessionRepo, UserRepo, VerificationRepo};
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{clear_refresh_cookie, refresh_cookie, REFRESH_COOKIE};
use crate::auth::jwt::{sign_access_token, sign_identity_token};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::verification::send_verification_email;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Refresh-token lifetime in remember-me mode.
const PERSIST_SESSION_DAYS: i64 = 7;

/// Refresh-token lifetime (and rolling-window size) in ephemeral mode.
const SHORT_SESSION_MINS: i64 = 30;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
///
/// `persist` is deliberately a required plain bool: it gates token lifetime,
/// so a request that omits it (or sends a non-boolean) is rejected at the
/// body boundary instead of silently defaulting.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub persist: bool,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub persist: bool,
}

/// Request body for `POST /auth/logout` (used when no cookie is present).
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub id: Option<DbId>,
}

/// Successful authentication response returned by register, login, and
/// refresh. The refresh token is NOT here -- it travels only in the cookie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user_id_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account, start a session, and kick off email verification.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    // 1. Field validation (422 with per-field details).
    validation::validate_new_user(&input.email, &input.username, &input.password)?;

    // 2. Case-insensitive duplicate check before insert, for a clean
    //    conflict error instead of a storage-level one.
    if UserRepo::find_by_username_ci(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::conflict_field(
            "Duplicate values encountered",
            "username",
            "Username already exists.",
        )));
    }

    // 3. Create the principal; the password is hashed before it ever
    //    reaches the repository.
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            username: input.username,
            password_hash,
        },
    )
    .await?;

    // 4-5. Mint tokens and open the refresh-token lineage.
    let (response, cookie) = issue_session(&state, &user, input.persist).await?;

    // 6. Email verification is fire-and-forget: the account and session are
    //    already persisted, so a failed send must not fail registration.
    let verification = generate_token();
    VerificationRepo::upsert_for_user(&state.pool, user.id, &verification.hash, Utc::now())
        .await?;
    send_verification_email(&state, &user, &verification.plaintext);

    // 7-8. Cookie carries the raw refresh token; the body never does.
    Ok((StatusCode::CREATED, jar.add(cookie), Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Replaces any existing session for
/// this user, so logging in on a second device signs the first one out.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    // Unknown email and wrong password produce the identical failure so the
    // endpoint cannot be used to enumerate accounts.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| CoreError::unauthorized("Incorrect username or password"))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::unauthorized(
            "Incorrect username or password",
        )));
    }

    let (response, cookie) = issue_session(&state, &user, input.persist).await?;

    Ok((jar.add(cookie), Json(response)))
}

/// GET /api/v1/auth/refresh
///
/// Exchange the refresh cookie for new tokens, rotating the stored hash.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    // 1. No cookie is an auth failure, not a validation error.
    let raw_token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| CoreError::unauthorized_kind("CookieError", "Cookie is missing"))?;

    // 2. Unknown hash stays deliberately generic: no hint whether the token
    //    ever existed.
    let old_hash = hash_token(&raw_token);
    let session = SessionRepo::find_by_token_hash(&state.pool, &old_hash)
        .await?
        .ok_or_else(|| CoreError::unauthorized("Credentials are wrong"))?;

    // 3. A real but dead credential gets the distinguished expiry failure so
    //    the client can redirect to login.
    let now = Utc::now();
    if !session.is_valid || now > session.expires_at {
        return Err(AppError::Core(CoreError::session_expired(
            "Your session has expired",
        )));
    }

    // 4. A session without its user is a data-integrity violation, not a
    //    normal auth failure.
    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| CoreError::internal("Something went wrong, please sign in again."))?;

    // 5. Rotation policy: persistent sessions keep their original ceiling
    //    and the cookie carries only the remaining time; short sessions
    //    slide the whole window forward.
    let fresh = generate_token();
    let (created_at, expires_at, cookie_ttl) = if session.persist {
        (
            session.created_at,
            session.expires_at,
            session.expires_at - now,
        )
    } else {
        let window = Duration::minutes(SHORT_SESSION_MINS);
        (now, now + window, window)
    };

    // 6. Compare-and-swap on the previous hash: when two refreshes race,
    //    exactly one of them lands and the other sees its credential as
    //    already spent.
    SessionRepo::rotate(&state.pool, &old_hash, &fresh.hash, created_at, expires_at)
        .await?
        .ok_or_else(|| CoreError::session_expired("Your session has expired"))?;

    let response = mint_tokens(&state, &user)?;

    Ok((
        jar.add(refresh_cookie(fresh.plaintext, cookie_ttl)),
        Json(response),
    ))
}

/// POST /api/v1/auth/logout
///
/// Invalidate the session found by the cookie, or by the user id from the
/// body when the cookie was already lost client-side. Idempotent for the
/// user, but an absent session row is surfaced as a failure so operational
/// problems stay observable.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<AppJson<LogoutRequest>>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let cookie_hash = jar.get(REFRESH_COOKIE).map(|c| hash_token(c.value()));

    let (jar, matched) = match cookie_hash {
        Some(hash) => {
            let matched = SessionRepo::invalidate_by_token_hash(&state.pool, &hash).await?;
            (jar.remove(clear_refresh_cookie()), matched)
        }
        None => {
            let id = body
                .and_then(|AppJson(b)| b.id)
                .ok_or_else(|| CoreError::internal("Something went wrong, retry logging out"))?;
            let matched = SessionRepo::invalidate_by_user(&state.pool, id).await?;
            (jar, matched)
        }
    };

    if !matched {
        return Err(AppError::Core(CoreError::internal(
            "Something went wrong, retry logging out",
        )));
    }

    Ok((jar, Json(MessageResponse::new("Logged out successfully."))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign the access + identity token pair for a user.
fn mint_tokens(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = sign_access_token(user.id, &state.config.auth)
        .map_err(|e| AppError::InternalError(format!("Token signing error: {e}")))?;

    let user_id_token = sign_identity_token(
        user.id,
        &user.email,
        &user.username,
        user.is_verified,
        &state.config.auth,
    )
    .map_err(|e| AppError::InternalError(format!("Token signing error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        user_id_token,
    })
}

/// Mint both tokens, open (or replace) the session row, and build the
/// refresh cookie. Shared by register and login.
async fn issue_session(
    state: &AppState,
    user: &User,
    persist: bool,
) -> AppResult<(AuthResponse, Cookie<'static>)> {
    let response = mint_tokens(state, user)?;

    let fresh = generate_token();
    let now = Utc::now();
    let ttl = if persist {
        Duration::days(PERSIST_SESSION_DAYS)
    } else {
        Duration::minutes(SHORT_SESSION_MINS)
    };

    SessionRepo::upsert_for_user(
        &state.pool,
        &UpsertSession {
            user_id: user.id,
            refresh_token_hash: fresh.hash,
            persist,
            created_at: now,
            expires_at: now + ttl,
        },
    )
    .await?;

    Ok((response, refresh_cookie(fresh.plaintext, ttl)))
}
