//! HTML boilerplate for account emails.
//!
//! Kept deliberately minimal: a heading, one call-to-action link, and the
//! expiry note matching the plain-text part.

/// HTML body for the email-verification message.
pub fn verification_html(link: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 480px; margin: 0 auto;">
  <h2>Verify your email</h2>
  <p>Click the button below to verify your moovies account.</p>
  <p style="margin: 24px 0;">
    <a href="{link}" style="background: #e50914; color: #fff; padding: 12px 24px; text-decoration: none; border-radius: 4px;">Verify account</a>
  </p>
  <p>The link expires after 24 hours. If it has expired, use the resend button to get a new one.</p>
  <p>If you did not create this account, you can ignore this email.</p>
</div>"#
    )
}

/// HTML body for the password-reset message.
pub fn password_reset_html(link: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 480px; margin: 0 auto;">
  <h2>Reset your password</h2>
  <p>Click the button below to choose a new password for your moovies account.</p>
  <p style="margin: 24px 0;">
    <a href="{link}" style="background: #e50914; color: #fff; padding: 12px 24px; text-decoration: none; border-radius: 4px;">Reset password</a>
  </p>
  <p>The link expires after 30 minutes. If it has expired, request a new one.</p>
  <p>If you did not ask for a reset, you can ignore this email.</p>
</div>"#
    )
}
