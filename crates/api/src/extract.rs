//! Request body extractors that reject with [`AppError`].

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::Json;
use educ_core::error::CoreError;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// JSON body that is deserialized, then checked with [`Validate`].
///
/// Malformed JSON is a `BAD_REQUEST`; a body that parses but fails its
/// validation rules is a `VALIDATION_ERROR`. Both are 400s carrying the
/// standard error body.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate().map_err(CoreError::from)?;
        Ok(ValidJson(value))
    }
}

/// Parse an optional JSON body; an empty body yields `T::default()`.
///
/// Used by endpoints that accept both `GET` without a body and `POST` with
/// one.
pub fn optional_json<T>(body: &Bytes) -> AppResult<T>
where
    T: DeserializeOwned + Default + Validate,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let value: T = serde_json::from_slice(body).map_err(|e| {
        AppError::BadRequest(format!("Failed to parse the request body as JSON: {e}"))
    })?;
    value.validate().map_err(CoreError::from)?;
    Ok(value)
}
