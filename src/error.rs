//! Error types for Kashidashi server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Application error codes exposed in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    StoreFailure = 3,
    NoSuchInstance = 4,
    NoSuchItem = 5,
    NoSuchClass = 6,
    DuplicateTag = 7,
    AlreadyBorrowed = 8,
    AlreadyAvailable = 9,
    TransactionConflict = 10,
    BadValue = 11,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate tag: {0}")]
    DuplicateTag(String),

    #[error("Instance {0} is already borrowed")]
    AlreadyBorrowed(String),

    #[error("Instance {0} is already available")]
    AlreadyAvailable(String),

    #[error("Item {0} does not exist")]
    MissingItem(String),

    #[error("Transaction could not be committed after retries")]
    TransactionConflict,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchInstance, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::DuplicateTag(tag) => (
                StatusCode::CONFLICT,
                ErrorCode::DuplicateTag,
                format!("Tag {} is already in use", tag),
            ),
            AppError::AlreadyBorrowed(_) => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyBorrowed, self.to_string())
            }
            AppError::AlreadyAvailable(_) => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyAvailable, self.to_string())
            }
            AppError::MissingItem(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchItem, self.to_string())
            }
            AppError::TransactionConflict => (
                StatusCode::CONFLICT,
                ErrorCode::TransactionConflict,
                self.to_string(),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StoreFailure,
                    "Store error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
