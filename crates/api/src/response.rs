//! Shared response envelope for API handlers.
//!
//! Every successful response is `{ "success": true, "data": ..., "message"? }`.
//! Errors use the matching `{ "success": false, "message", "code" }` shape
//! produced by [`crate::error::AppError`].

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Standard success envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// `{ success: true, data: null, message }`, used by deletes.
    pub fn done(message: impl Into<String>) -> Self {
        Self::with_message((), message)
    }
}

/// `201 Created` with the envelope, used by create handlers.
pub fn created<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::with_message(data, message)))
}
