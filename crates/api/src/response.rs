//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "success": true, ... }` envelope returned by mutation endpoints.
///
/// The payload is flattened next to `success`, so a payload struct with an
/// `attendance` field serializes as `{"success": true, "attendance": ...}`.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(payload: T) -> Self {
        Self {
            success: true,
            payload,
        }
    }
}
