//! Request-body extraction with domain-shaped rejections.
//!
//! Axum's stock `Json` extractor answers malformed bodies with its own
//! status codes (422 for data errors). The auth contract instead requires
//! every missing or malformed input -- including a missing `persist` flag,
//! which gates token lifetime -- to be a 400 in the standard error body, so
//! handlers take [`AppJson`] instead of `Json`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, OptionalFromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use moovies_core::error::CoreError;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor whose rejection is a 400 [`AppError`].
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match <axum::Json<T> as FromRequest<S>>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(reject(rejection)),
        }
    }
}

/// `Option<AppJson<T>>` treats a bodyless request (no JSON content type) as
/// absent instead of failing; a present-but-malformed body still rejects.
impl<T, S> OptionalFromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json") || ct.contains("+json"));

        if !is_json {
            return Ok(None);
        }

        match <axum::Json<T> as FromRequest<S>>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Some(AppJson(value))),
            Err(rejection) => Err(reject(rejection)),
        }
    }
}

fn reject(rejection: JsonRejection) -> AppError {
    AppError::Core(CoreError::bad_request(rejection.body_text()))
}
