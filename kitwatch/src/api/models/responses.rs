//! The response envelope shared by every `/v1` endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform response body: `{ success, message, data, error }`.
///
/// Successful responses carry `data` and a null `error`; failures carry a null `data` and a
/// user-safe `error` string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}
