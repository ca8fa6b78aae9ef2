use crate::{
    model_service::InferenceError, normalizer::DecodeError, store::StoreError,
    upload::ValidationError,
};
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Malformed upload: {}", .0.body_text())]
    Upload(#[from] MultipartError),
    #[error("Model not loaded.")]
    ModelUnavailable,
    #[error("Processing error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Processing error: {0}")]
    Inference(#[from] InferenceError),
    #[error("{0}")]
    Store(#[from] StoreError),
    /// Store failure while saving a prediction.
    #[error("Processing error: {0}")]
    Persist(StoreError),
    #[error("File not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) => e.status(),
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::ModelUnavailable
            | ApiError::Decode(_)
            | ApiError::Inference(_)
            | ApiError::Store(_)
            | ApiError::Persist(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(ValidationError::NoFileUploaded).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::ModelUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(StoreError::Unavailable("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::from(ValidationError::NoFileSelected).to_string(),
            "No file selected"
        );
        assert_eq!(
            ApiError::from(DecodeError::UnknownFormat).to_string(),
            "Processing error: Unrecognized image format"
        );
        assert_eq!(ApiError::ModelUnavailable.to_string(), "Model not loaded.");
        assert_eq!(
            ApiError::Persist(StoreError::Unavailable("down".into())).to_string(),
            "Processing error: Record store unavailable: down"
        );
    }
}
