//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tang_core::TangError;
use thiserror::Error;
use tracing::error;

use crate::core::ExchangeKeyError;
use crate::keys::KeyManagerError;
use crate::storage::StorageError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not configured: {0}")]
    Unconfigured(String),

    #[error("Storage unavailable")]
    StorageUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unconfigured(_)
            | ApiError::StorageUnavailable
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Unconfigured(_) => "NOT_CONFIGURED",
            ApiError::StorageUnavailable => "STORAGE_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // Backend details (paths, hostnames) stay in the log
        error!(error = %err, "Storage operation failed");
        ApiError::StorageUnavailable
    }
}

impl From<TangError> for ApiError {
    fn from(err: TangError) -> Self {
        match err {
            TangError::Crypto(msg) => {
                error!(error = %msg, "Cryptographic operation failed");
                ApiError::Internal("Cryptographic operation failed".into())
            }
            TangError::Serialization(msg) => {
                error!(error = %msg, "Serialization failed");
                ApiError::Internal("Serialization failed".into())
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<KeyManagerError> for ApiError {
    fn from(err: KeyManagerError) -> Self {
        match err {
            KeyManagerError::Storage(e) => e.into(),
            KeyManagerError::Key(e) => {
                error!(error = %e, "Key management failed");
                ApiError::Internal("Key management failed".into())
            }
        }
    }
}

impl From<ExchangeKeyError> for ApiError {
    fn from(err: ExchangeKeyError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}
