use crate::library::LibraryError;
use crate::playlist::{AllocationError, PlaylistError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// API error type, rendered as `{"error": "<message>"}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Unknown mood (404)
    #[error("{0}")]
    NotFound(String),

    /// Well-formed request that cannot produce a playlist (422)
    #[error("{0}")]
    Unprocessable(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::MoodNotFound(mood) => {
                tracing::warn!(mood = %mood, "Mood folder not found");
                ApiError::NotFound("Mood not found".to_string())
            }
            LibraryError::Io { .. } => {
                tracing::error!(error = %err, "Library read failed");
                ApiError::Internal("Error reading songs".to_string())
            }
        }
    }
}

impl From<PlaylistError> for ApiError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::InvalidArgument(err) => err.into(),
            PlaylistError::Library(err) => err.into(),
            PlaylistError::EmptyMix => ApiError::Unprocessable(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!(error = %err, "Blocking task failed");
        ApiError::Internal("Internal Server Error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
