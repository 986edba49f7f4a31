use std::sync::Arc;

use moovies_mailer::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: moovies_db::DbPool,
    /// Server configuration, including the injected signing keys.
    pub config: Arc<ServerConfig>,
    /// SMTP mailer; `None` when SMTP is not configured, in which case
    /// account emails are skipped and the skip is logged.
    pub mailer: Option<Arc<Mailer>>,
}
