//! Request extractors that reject with the JSON error envelope.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use htw_core::error::CoreError;
use htw_core::types::{DbId, INVALID_OBJECT_ID_MARKER};

use crate::error::AppError;

/// A single `{id}`-style path segment parsed as a document identifier.
///
/// A malformed segment is rejected with 400 `INVALID_ID` before the handler
/// touches the database.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub DbId);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        DbId::parse_str(&raw)
            .map(IdPath)
            .map_err(|_| AppError::InvalidId(raw))
    }
}

/// `axum::Json` whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejections use the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON that does not fit the target type.
            JsonRejection::JsonDataError(err) => {
                AppError::Core(CoreError::Validation(err.body_text()))
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let message = rejection.body_text();
        match rejected_identifier(&message) {
            Some(raw) => AppError::InvalidId(raw),
            None => AppError::BadRequest(message),
        }
    }
}

/// Pull the offending value out of a deserialization message produced by a
/// malformed identifier, e.g. `moduleId: 'abc' is not a valid identifier`.
fn rejected_identifier(message: &str) -> Option<String> {
    let (head, _) = message.split_once(INVALID_OBJECT_ID_MARKER)?;
    let quoted = head.trim_end().strip_suffix('\'')?;
    let (_, raw) = quoted.rsplit_once('\'')?;
    Some(raw.to_string())
}
