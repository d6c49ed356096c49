//! Application error types and their HTTP mapping.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repositories::StoreError;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Login failure. Same variant for an unknown email and a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Store operation timed out")]
    Timeout,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                json!({ "message": INVALID_CREDENTIALS_MESSAGE }),
            ),
            AppError::TokenInvalid => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid or missing token" }),
            ),
            AppError::TokenExpired => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Token expired, please log in again" }),
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("Not found: {}", what) }),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "message": "Request body too large" }),
            ),
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "message": "Too many requests, please try again later." }),
            ),
            AppError::Upstream(detail) => {
                error!(error = %detail, "upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "message": "Upstream service unavailable" }),
                )
            }
            AppError::Timeout | AppError::Store(_) | AppError::Internal(_) => {
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": SERVER_ERROR_MESSAGE, "error": "internal error" }),
                )
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let AppError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}

pub type AppResult<T> = Result<T, AppError>;
