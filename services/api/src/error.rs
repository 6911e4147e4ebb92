//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    repositories::{
        COMMENT_RECORD_FKEY, EMAIL_KEY, StoreError, USER_RECORD_PAIR_KEY, USER_RECORD_RECORD_FKEY,
        USERNAME_KEY,
    },
    validation::{CommentContentError, ValidationError},
};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, malformed or expired credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but acting on someone else's resource
    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    CommentContent(#[from] CommentContentError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Client-facing message for a unique key collision
fn conflict_message(key: &str) -> &'static str {
    match key {
        USER_RECORD_PAIR_KEY => "Record is already in your collection",
        USERNAME_KEY => "Username is already taken",
        EMAIL_KEY => "Email is already registered",
        _ => "Resource already exists",
    }
}

/// Client-facing message for a write that referenced a vanished row
fn missing_reference_message(key: &str) -> &'static str {
    match key {
        USER_RECORD_RECORD_FKEY | COMMENT_RECORD_FKEY => "Record not found",
        _ => "Referenced resource not found",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Validation(e) => {
                warn!("Rejected payload: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::CommentContent(e) => {
                warn!("Rejected comment: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Store(StoreError::DuplicateKey(key)) => {
                warn!("Duplicate key on {}", key);
                (StatusCode::CONFLICT, conflict_message(&key).to_string())
            }
            ApiError::Store(StoreError::MissingReference(key)) => {
                warn!("Missing reference on {}", key);
                (StatusCode::NOT_FOUND, missing_reference_message(&key).to_string())
            }
            ApiError::Store(StoreError::Database(e)) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
