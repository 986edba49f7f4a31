use crate::auth::jwt::AuthConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the signing keys have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Origin used when building links embedded in account emails.
    pub public_origin: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Token signing keys and lifetimes.
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `8080`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `PUBLIC_ORIGIN`        | first CORS origin       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    ///
    /// Signing-key variables are documented on [`AuthConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable fails to parse or a required signing key
    /// is missing -- misconfiguration should fail fast at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let public_origin = std::env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| {
            cors_origins
                .first()
                .cloned()
                .expect("CORS_ORIGINS must contain at least one origin")
        });

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let auth = AuthConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            public_origin,
            request_timeout_secs,
            auth,
        }
    }
}
