//! HTTP-level integration tests for the register / login / refresh / logout
//! flows: cookie policy, rotation semantics, single-session enforcement,
//! and the error contract.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, cookie_header, cookie_max_age, cookie_value, get, get_with_cookie,
    post_empty, post_json, post_with_cookie, set_cookie_header,
};
use moovies_api::auth::password::verify_password;
use sqlx::PgPool;

/// Cookie lifetime for a remember-me session, in seconds.
const PERSIST_MAX_AGE: i64 = 7 * 24 * 60 * 60;

/// Cookie lifetime for an ephemeral session, in seconds.
const SHORT_MAX_AGE: i64 = 30 * 60;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn register_body(email: &str, username: &str, persist: bool) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "username": username,
        "password": "Passw0rd!",
        "persist": persist,
    })
}

fn login_body(email: &str, persist: bool) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": "Passw0rd!",
        "persist": persist,
    })
}

/// Register a user and return `(refresh cookie value, response json)`.
async fn register_user(
    app: &axum::Router,
    email: &str,
    username: &str,
    persist: bool,
) -> (String, serde_json::Value) {
    let response = post_json(app, "/api/v1/auth/register", register_body(email, username, persist)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = cookie_value(&set_cookie_header(&response));
    let json = body_json(response).await;
    (cookie, json)
}

/// Fetch the stored session row for a user.
async fn session_row(pool: &PgPool, email: &str) -> (String, bool, bool, chrono::DateTime<chrono::Utc>) {
    sqlx::query_as::<_, (String, bool, bool, chrono::DateTime<chrono::Utc>)>(
        "SELECT s.refresh_token_hash, s.is_valid, s.persist, s.expires_at
         FROM user_sessions s JOIN users u ON u.id = s.user_id
         WHERE u.email = $1",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("session row should exist")
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// Successful registration returns 201 with both signed tokens and an
/// ephemeral refresh cookie.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_success(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("alice@x.com", "alice", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookie = set_cookie_header(&response);
    assert_eq!(cookie_max_age(&set_cookie), SHORT_MAX_AGE);
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("SameSite=None"));

    let raw_token = cookie_value(&set_cookie);
    let json = body_json(response).await;
    assert!(json["accessToken"].is_string(), "response must contain accessToken");
    assert!(json["userIdToken"].is_string(), "response must contain userIdToken");
    // The raw refresh token never appears in the body.
    assert!(!json.to_string().contains(&raw_token));

    // Only the token's digest is persisted.
    let (stored_hash, is_valid, persist, _) = session_row(&pool, "alice@x.com").await;
    assert_ne!(stored_hash, raw_token);
    assert_eq!(stored_hash, moovies_core::tokens::hash_token(&raw_token));
    assert!(is_valid);
    assert!(!persist);
}

/// The stored password hash is never the plaintext, and verifies exactly
/// against the registered password.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_password_is_hashed(pool: PgPool) {
    let app = build_test_app(pool.clone());
    register_user(&app, "alice@x.com", "alice", false).await;

    let (hash,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE email = 'alice@x.com'")
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_ne!(hash, "Passw0rd!");
    assert!(verify_password("Passw0rd!", &hash).unwrap());
    assert!(!verify_password("Passw0rd?", &hash).unwrap());
}

/// A remember-me registration sets the 7-day cookie window.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_persist_cookie_window(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("bob@x.com", "bob", true),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(cookie_max_age(&set_cookie_header(&response)), PERSIST_MAX_AGE);
}

/// Usernames are unique case-insensitively: "Bob" after "bob" conflicts.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_duplicate_username_case_insensitive(pool: PgPool) {
    let app = build_test_app(pool);
    register_user(&app, "bob@x.com", "bob", false).await;

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("other@x.com", "Bob", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Conflict");
    assert_eq!(json["details"][0]["field"], "username");
}

/// A duplicate email surfaces as 409 via the unique constraint.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_duplicate_email(pool: PgPool) {
    let app = build_test_app(pool);
    register_user(&app, "bob@x.com", "bob", false).await;

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        register_body("bob@x.com", "robert", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["details"][0]["field"], "email");
}

/// Malformed-but-present fields are 422 with one detail per field.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_invalid_fields(pool: PgPool) {
    let app = build_test_app(pool);

    let body = serde_json::json!({
        "email": "not-an-email",
        "username": "ab",
        "password": "weak",
        "persist": false,
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "UnprocessableEntity");
    assert_eq!(json["details"].as_array().unwrap().len(), 3);
}

/// A missing `persist` flag is rejected outright: it gates token lifetime
/// and must be explicit.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_requires_persist(pool: PgPool) {
    let app = build_test_app(pool);

    let body = serde_json::json!({
        "email": "alice@x.com",
        "username": "alice",
        "password": "Passw0rd!",
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A non-boolean persist is just as invalid.
    let body = serde_json::json!({
        "email": "alice@x.com",
        "username": "alice",
        "password": "Passw0rd!",
        "persist": "yes",
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Login issues tokens and the cookie window matching the persist flag.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_cookie_windows(pool: PgPool) {
    let app = build_test_app(pool);
    register_user(&app, "alice@x.com", "alice", false).await;

    let response = post_json(&app, "/api/v1/auth/login", login_body("alice@x.com", true)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cookie_max_age(&set_cookie_header(&response)), PERSIST_MAX_AGE);
    let json = body_json(response).await;
    assert!(json["accessToken"].is_string());
    assert!(json["userIdToken"].is_string());

    let response = post_json(&app, "/api/v1/auth/login", login_body("alice@x.com", false)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cookie_max_age(&set_cookie_header(&response)), SHORT_MAX_AGE);
}

/// Unknown email and wrong password are indistinguishable to the caller.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_failures_do_not_enumerate(pool: PgPool) {
    let app = build_test_app(pool);
    register_user(&app, "alice@x.com", "alice", false).await;

    let unknown = post_json(&app, "/api/v1/auth/login", login_body("ghost@x.com", false)).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_json = body_json(unknown).await;

    let wrong_pw = serde_json::json!({
        "email": "alice@x.com",
        "password": "Wr0ng-password!",
        "persist": false,
    });
    let wrong = post_json(&app, "/api/v1/auth/login", wrong_pw).await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_json = body_json(wrong).await;

    assert_eq!(
        unknown_json["message"], wrong_json["message"],
        "both failure modes must produce the identical message"
    );
}

/// A second login replaces the first session: the first refresh token is
/// dead afterwards.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_second_login_displaces_first_session(pool: PgPool) {
    let app = build_test_app(pool);
    let (first_cookie, _) = register_user(&app, "alice@x.com", "alice", false).await;

    let response = post_json(&app, "/api/v1/auth/login", login_body("alice@x.com", false)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second_cookie = cookie_value(&set_cookie_header(&response));

    let stale = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&first_cookie)).await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    let live = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&second_cookie)).await;
    assert_eq!(live.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

/// Refresh without the cookie is an auth failure, not a validation error.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_requires_cookie(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(&app, "/api/v1/auth/refresh").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "CookieError");
}

/// A token that never existed gets the generic credential failure.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_unknown_token(pool: PgPool) {
    let app = build_test_app(pool);

    let response =
        get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header("not-a-real-token")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Unauthorized");
}

/// The concrete lifecycle scenario: register ephemeral, refresh once,
/// replay the stale cookie, get rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_rotates_and_stale_cookie_fails(pool: PgPool) {
    let app = build_test_app(pool);
    let (old_token, _) = register_user(&app, "alice@x.com", "alice", false).await;

    let response = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&old_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let new_token = cookie_value(&set_cookie_header(&response));
    assert_ne!(new_token, old_token, "refresh token must rotate on use");
    let json = body_json(response).await;
    assert!(json["accessToken"].is_string());
    assert!(json["userIdToken"].is_string());

    // The old lineage member is spent: exactly one use per token.
    let stale = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&old_token)).await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    // The rotated token still works.
    let live = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&new_token)).await;
    assert_eq!(live.status(), StatusCode::OK);
}

/// Refreshing a persistent session never extends the original expiry; the
/// cookie carries only the remaining window.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_persistent_keeps_ceiling(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (token, _) = register_user(&app, "bob@x.com", "bob", true).await;

    let (_, _, _, expires_before) = session_row(&pool, "bob@x.com").await;

    let response = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, _, persist, expires_after) = session_row(&pool, "bob@x.com").await;
    assert!(persist);
    assert_eq!(
        expires_before, expires_after,
        "persistent refresh must not move the expiry ceiling"
    );

    let max_age = cookie_max_age(&set_cookie_header(&response));
    assert!(
        max_age <= PERSIST_MAX_AGE && max_age > PERSIST_MAX_AGE - 60,
        "cookie must carry the remaining window, got {max_age}"
    );
}

/// Refreshing an ephemeral session slides the whole window forward.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_ephemeral_slides_window(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (token, _) = register_user(&app, "alice@x.com", "alice", false).await;

    let (_, _, _, expires_before) = session_row(&pool, "alice@x.com").await;

    // Ensure the clock observably advances past timestamp precision.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let response = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cookie_max_age(&set_cookie_header(&response)), SHORT_MAX_AGE);

    let (_, _, _, expires_after) = session_row(&pool, "alice@x.com").await;
    assert!(
        expires_after > expires_before,
        "ephemeral refresh must slide the expiry forward"
    );
}

/// A session past its expiry gets the distinguished session-expired failure
/// rather than the generic one.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_expired_session(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (token, _) = register_user(&app, "alice@x.com", "alice", false).await;

    sqlx::query("UPDATE user_sessions SET expires_at = NOW() - INTERVAL '1 minute'")
        .execute(&pool)
        .await
        .unwrap();

    let response = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&token)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "TokenExpiredError");
    assert_eq!(json["message"], "Your session has expired");
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// Logout via cookie invalidates the session and clears the cookie.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_with_cookie(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (token, _) = register_user(&app, "alice@x.com", "alice", false).await;

    let response = post_with_cookie(&app, "/api/v1/auth/logout", &cookie_header(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = set_cookie_header(&response);
    assert_eq!(cookie_value(&set_cookie), "", "cookie must be cleared");
    assert_eq!(cookie_max_age(&set_cookie), 0);

    let (_, is_valid, _, _) = session_row(&pool, "alice@x.com").await;
    assert!(!is_valid, "session must be invalidated");

    // The old refresh token no longer resolves to a live session.
    let stale = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&token)).await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
}

/// Without a cookie, logout falls back to the user id in the body.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_by_user_id(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (token, _) = register_user(&app, "alice@x.com", "alice", false).await;

    let (user_id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE email = 'alice@x.com'")
        .fetch_one(&pool)
        .await
        .unwrap();

    let response = post_json(
        &app,
        "/api/v1/auth/logout",
        serde_json::json!({ "id": user_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stale = get_with_cookie(&app, "/api/v1/auth/refresh", &cookie_header(&token)).await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
}

/// Logout stays idempotent for the user: an already-invalid session still
/// reports success.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_twice_succeeds(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register_user(&app, "alice@x.com", "alice", false).await;

    let first = post_with_cookie(&app, "/api/v1/auth/logout", &cookie_header(&token)).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_with_cookie(&app, "/api/v1/auth/logout", &cookie_header(&token)).await;
    assert_eq!(second.status(), StatusCode::OK);
}

/// With neither a cookie nor a body id there is nothing to invalidate; the
/// failure stays observable.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_without_target_fails(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_empty(&app, "/api/v1/auth/logout").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// Logout against a session row that does not exist surfaces the failure.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_unknown_session_fails(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(&app, "/api/v1/auth/logout", serde_json::json!({ "id": 999 })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ---------------------------------------------------------------------------
// Plumbing
// ---------------------------------------------------------------------------

/// The health endpoint responds without auth.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_health(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

/// Body-less or non-JSON register requests are 400s, and a wrong method on
/// a known path is 405.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_malformed_requests(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_empty(&app, "/api/v1/auth/register").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/api/v1/auth/register").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
