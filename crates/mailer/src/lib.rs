//! Outbound account email via SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport to send the two kinds
//! of account mail this service produces: email-verification links and
//! password-reset links. Configuration is loaded from environment variables;
//! if `SMTP_HOST` is not set, [`MailerConfig::from_env`] returns `None` and
//! callers skip dispatch (logging the skip) instead of failing requests.

pub mod templates;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// MailKind
// ---------------------------------------------------------------------------

/// Which HTML boilerplate a message is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    Verification,
    PasswordReset,
}

// ---------------------------------------------------------------------------
// MailerConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "no-reply@moovies.local";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl MailerConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// dispatch is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                  |
    /// |-----------------|----------|--------------------------|
    /// | `SMTP_HOST`     | yes      | --                       |
    /// | `SMTP_PORT`     | no       | `587`                    |
    /// | `SMTP_FROM`     | no       | `no-reply@moovies.local` |
    /// | `SMTP_USER`     | no       | --                       |
    /// | `SMTP_PASSWORD` | no       | --                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends account emails (verification, password reset) via SMTP.
pub struct Mailer {
    config: MailerConfig,
}

impl Mailer {
    /// Create a new mailer with the given configuration.
    pub fn new(config: MailerConfig) -> Self {
        Self { config }
    }

    /// Send an account email with a plain-text body and the HTML boilerplate
    /// selected by `kind`, both carrying `link`.
    pub async fn send(
        &self,
        to_email: &str,
        subject: &str,
        text_body: String,
        kind: MailKind,
        link: &str,
    ) -> Result<(), MailError> {
        use lettre::{
            message::MultiPart, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
            AsyncTransport, Message, Tokio1Executor,
        };

        let html_body = match kind {
            MailKind::Verification => templates::verification_html(link),
            MailKind::PasswordReset => templates::password_reset_html(link),
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text_body, html_body))
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, kind = ?kind, "Account email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
