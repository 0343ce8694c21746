//! Request extractors that report failures through [`AppError`].

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use revingest_core::error::CoreError;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor whose every rejection is a validation error (422).
///
/// Axum's own `Json` answers syntax errors with 400 and a missing
/// content type with 415; callers of this API only distinguish "accepted"
/// from "invalid body", so all of them collapse into `VALIDATION_ERROR`.
/// An oversized body stays a 413.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(AppError::PayloadTooLarge(rejection.body_text()))
            }
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(AppError::Core(CoreError::Validation(rejection.body_text())))
            }
        }
    }
}
