use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

pub const MISSING_CHAT_FIELDS: &str = "Message and category are required";

/// Errors surfaced to HTTP callers as `{ "error": ... }` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.to_string()),
            ApiError::NotFound(_) | ApiError::Store(StoreError::ConversationNotFound(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Store(e) => {
                error!(error = %e, "Conversation store request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to access conversation store".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
