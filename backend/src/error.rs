//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.
//! Component errors (store, hasher, token) are translated into exactly one
//! variant here; their details are logged, never returned to the caller.

use crate::auth::{HashError, TokenError};
use crate::repositories::StoreError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use user_accounts_shared::types::{ErrorDetail, ErrorResponse};
use user_accounts_shared::ValidationError;

/// Message for every failed login, whichever part of the credential was wrong
pub const INVALID_CREDENTIALS: &str = "Wrong email or password";

/// Message for every rejected token, whatever check failed
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid field: {0}")]
    InvalidField(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Generic credential failure for login
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
    }

    /// Generic token failure for the authorization gate
    pub fn authentication_required() -> Self {
        ApiError::Unauthorized(AUTHENTICATION_REQUIRED.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => {
                ApiError::Conflict("User with this email already exists".to_string())
            }
            other => ApiError::Internal(anyhow::Error::new(other).context("user store failure")),
        }
    }
}

impl From<HashError> for ApiError {
    fn from(err: HashError) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("password hashing failure"))
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) => {
                ApiError::Internal(anyhow::Error::new(err).context("token signing failure"))
            }
            TokenError::Malformed | TokenError::BadSignature | TokenError::Expired => {
                ApiError::authentication_required()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            ApiError::InvalidField(err) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.user_message(),
                Some(err.field.clone()),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
