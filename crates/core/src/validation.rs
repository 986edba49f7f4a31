//! Field validation for account input.
//!
//! Values reach these checks already present (missing fields are rejected at
//! the body-deserialization boundary with 400), so every failure here is a
//! well-formed-but-invalid value and surfaces as 422 with per-field details.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CoreError, FieldDetail};

/// Username length bounds, inclusive.
pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 20;

/// Password length bounds, inclusive.
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 24;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
    )
    .expect("valid regex")
});

const EMAIL_MESSAGE: &str = "Please provide a valid email";
const USERNAME_MESSAGE: &str = "Username must be 4-20 characters long";
const PASSWORD_MESSAGE: &str = "Password must be at least 8-24 characters long and include \
                                an uppercase letter, a lowercase letter, a number, and a special character";

/// Validate an email address. Returns the field detail on failure.
pub fn check_email(email: &str) -> Option<FieldDetail> {
    if EMAIL_RE.is_match(email) {
        None
    } else {
        Some(FieldDetail::new("email", EMAIL_MESSAGE))
    }
}

/// Validate a username (length bounds only).
pub fn check_username(username: &str) -> Option<FieldDetail> {
    let len = username.chars().count();
    if (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        None
    } else {
        Some(FieldDetail::new("username", USERNAME_MESSAGE))
    }
}

/// Validate password complexity: 8-24 characters with at least one digit,
/// one special character, one lowercase, and one uppercase letter.
pub fn check_password(password: &str) -> Option<FieldDetail> {
    let len = password.chars().count();
    let ok = (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| "!@#$%^&*".contains(c))
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase());
    if ok {
        None
    } else {
        Some(FieldDetail::new("password", PASSWORD_MESSAGE))
    }
}

/// Validate all registration fields at once.
///
/// Collects every failing field into a single `UnprocessableEntity` whose
/// message names the offending fields.
pub fn validate_new_user(email: &str, username: &str, password: &str) -> Result<(), CoreError> {
    let details: Vec<FieldDetail> = [
        check_email(email),
        check_username(username),
        check_password(password),
    ]
    .into_iter()
    .flatten()
    .collect();

    if details.is_empty() {
        return Ok(());
    }

    let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
    Err(CoreError::unprocessable(
        format!("Validation failed for {}", fields.join(", ")),
        details,
    ))
}

/// Validate a replacement password (used by password change and reset).
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    match check_password(password) {
        None => Ok(()),
        Some(detail) => Err(CoreError::unprocessable(
            "Validation failed for password",
            vec![detail],
        )),
    }
}

/// Validate a replacement username.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    match check_username(username) {
        None => Ok(()),
        Some(detail) => Err(CoreError::unprocessable(
            "Validation failed for username",
            vec![detail],
        )),
    }
}
