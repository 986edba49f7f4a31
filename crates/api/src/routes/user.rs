//! Route definitions for the `/user` resource.

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`. Every handler authenticates via the
/// [`AuthUser`](crate::middleware::auth::AuthUser) extractor.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/settings", get(user::get_settings))
        .route("/{id}/settings/username", patch(user::update_username))
        .route("/{id}/settings/password", patch(user::update_password))
        .route("/{id}", delete(user::delete_account))
}
