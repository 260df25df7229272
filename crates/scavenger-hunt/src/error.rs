//! Error types for the scavenger hunt service.

use crate::api::pages;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use hunt_progress::ProgressError;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Service error types.
#[derive(Debug, Error)]
pub enum HuntError {
    #[error("Invalid QR code: {0}")]
    InvalidCode(String),

    #[error("Invalid registration number: {0}")]
    InvalidRegistrationFormat(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HuntError {
    pub fn status(&self) -> StatusCode {
        match self {
            HuntError::InvalidCode(_) => StatusCode::BAD_REQUEST,
            HuntError::InvalidRegistrationFormat(_) => StatusCode::BAD_REQUEST,
            HuntError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            HuntError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HuntError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HuntError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            HuntError::InvalidCode(_) => pages::invalid_code(),
            HuntError::InvalidRegistrationFormat(_) => pages::invalid_registration(),
            HuntError::RateLimited { .. } => pages::rate_limited(),
            HuntError::StorageUnavailable(_) | HuntError::Internal(_) => {
                error!("Request failed: {}", self);
                pages::server_error()
            }
        };

        let mut response = (status, Html(body)).into_response();

        if let HuntError::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(retry_after)));
        }

        response
    }
}

/// Whole seconds for a `Retry-After` header, rounded up.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

impl From<ProgressError> for HuntError {
    fn from(e: ProgressError) -> Self {
        match e {
            ProgressError::InvalidCode(code) => HuntError::InvalidCode(code),
            ProgressError::StorageUnavailable(msg) => HuntError::StorageUnavailable(msg),
            ProgressError::Serialization(e) => {
                HuntError::StorageUnavailable(format!("corrupt participant record: {}", e))
            }
            ProgressError::Config(msg) => HuntError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(HuntError::InvalidCode("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            HuntError::InvalidRegistrationFormat("a1".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HuntError::RateLimited {
                retry_after: Duration::from_secs(59)
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            HuntError::StorageUnavailable("down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_secs(59)), 59);
        assert_eq!(retry_after_secs(Duration::from_millis(58_001)), 59);
        assert_eq!(retry_after_secs(Duration::from_millis(250)), 1);
    }

    #[test]
    fn test_rate_limited_response_has_retry_after() {
        let response = HuntError::RateLimited {
            retry_after: Duration::from_millis(41_500),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_progress_error_mapping() {
        let err: HuntError = ProgressError::InvalidCode("zzz".into()).into();
        assert!(matches!(err, HuntError::InvalidCode(_)));

        let err: HuntError = ProgressError::StorageUnavailable("timeout".into()).into();
        assert!(matches!(err, HuntError::StorageUnavailable(_)));
    }
}
