//! HTTP error type.
//!
//! Every failure that reaches a handler boundary is an [`ApiError`]; it
//! renders as `{"detail": "<message>"}` with the matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geotiff_reader::GeoTiffError;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Processing(String),
}

impl ApiError {
    pub fn http_status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Configuration(_) | ApiError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status_code();
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFilename(_) | StorageError::UnsupportedExtension(_) => {
                ApiError::BadRequest(err.to_string())
            }
            StorageError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StorageError::Io(_) | StorageError::Upload(_) => ApiError::Processing(err.to_string()),
        }
    }
}

impl From<GeoTiffError> for ApiError {
    fn from(err: GeoTiffError) -> Self {
        match err {
            GeoTiffError::BandOutOfRange { .. } => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Processing(err.to_string()),
        }
    }
}
