//! Shared error vocabulary for the GlucoTrack services
//!
//! Every service-facing failure maps to one `ApiError` kind with a fixed
//! HTTP status and a stable `SCREAMING_SNAKE` code, rendered as a
//! `{"error": ..., "details": ...}` body. Internal causes (database, HTTP
//! client) are logged and replaced with a generic message before they reach
//! the wire.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Failure kinds shared by the auth service and the gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    DisabledAccount,

    #[error("Email address already in use")]
    DuplicateIdentity,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token subject does not resolve to a known account")]
    UnknownSubject,

    #[error("Missing or malformed Authorization header")]
    MissingAuthHeader,

    #[error("Invalid internal API key")]
    InvalidApiKey,

    #[error("Insufficient role for this operation")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    /// The only retry-eligible kind. Carries the internal cause for logging;
    /// the cause never reaches the response body.
    #[error("Upstream dependency unavailable")]
    UpstreamUnavailable(String),

    /// Unexpected in-process failure. The cause is logged, never returned.
    #[error("Internal server error")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl ApiError {
    /// Stable machine-readable code, mirrored in client error handling.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::DisabledAccount => "DISABLED_ACCOUNT",
            ApiError::DuplicateIdentity => "DUPLICATE_IDENTITY",
            ApiError::Malformed => "MALFORMED_TOKEN",
            ApiError::InvalidSignature => "INVALID_SIGNATURE",
            ApiError::Expired => "EXPIRED_TOKEN",
            ApiError::UnknownSubject => "UNKNOWN_SUBJECT",
            ApiError::MissingAuthHeader => "MISSING_AUTH_HEADER",
            ApiError::InvalidApiKey => "INVALID_API_KEY",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateIdentity | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::Malformed
            | ApiError::InvalidSignature
            | ApiError::Expired
            | ApiError::UnknownSubject
            | ApiError::MissingAuthHeader
            | ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::DisabledAccount | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-safe detail string. Internal causes stay in the logs.
    fn details(&self) -> String {
        match self {
            ApiError::UpstreamUnavailable(_) => {
                "A dependent service is temporarily unavailable".to_string()
            }
            ApiError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::UpstreamUnavailable(cause) => {
                tracing::error!(error = %cause, "upstream dependency failure");
            }
            ApiError::Internal(cause) => {
                tracing::error!(error = %cause, "internal failure");
            }
            _ => {}
        }

        HttpResponse::build(self.status()).json(ErrorBody {
            error: self.code().to_string(),
            details: self.details(),
        })
    }
}
