//! Wire contract of the backend data service.
//!
//! Both endpoints are plain `GET`s returning JSON. Failures carry an HTTP
//! error status and, usually, a body of the form `{"error": "..."}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-location weather outlooks.
pub const FORECAST_ENDPOINT: &str = "/api/all_locations_forecast";

/// Active tropical cyclone tracks.
pub const TYPHOON_ENDPOINT: &str = "/api/typhoon_warning";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(String),
    /// Error status without a readable error body.
    #[error("HTTP error: {status}")]
    Http { status: u16 },
    /// Error status with the service's own message.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FeedError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::Http { status } | FeedError::Api { status, .. } => Some(*status),
            FeedError::Network(_) | FeedError::Decode(_) => None,
        }
    }
}

/// A complete response as read off the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body of a successful reply, or the error the reply describes.
    pub fn into_success_body(self) -> Result<String, FeedError> {
        if self.is_success() {
            return Ok(self.body);
        }
        match serde_json::from_str::<ApiErrorBody>(&self.body) {
            Ok(ApiErrorBody { error }) if !error.trim().is_empty() => Err(FeedError::Api {
                status: self.status,
                message: error,
            }),
            _ => Err(FeedError::Http {
                status: self.status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FeedError, HttpReply};

    #[test]
    fn success_passes_body_through() {
        let body = HttpReply::new(200, "[]").into_success_body().unwrap();
        assert_eq!(body, "[]");
    }

    #[test]
    fn error_body_message_is_used() {
        let err = HttpReply::new(502, r#"{"error": "upstream timed out"}"#)
            .into_success_body()
            .unwrap_err();
        assert_eq!(err.to_string(), "upstream timed out");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn unreadable_error_body_falls_back_to_status() {
        for body in ["<html>oops</html>", r#"{"error": ""}"#, r#"{"detail": "x"}"#] {
            let err = HttpReply::new(500, body).into_success_body().unwrap_err();
            assert!(matches!(err, FeedError::Http { status: 500 }));
            assert_eq!(err.to_string(), "HTTP error: 500");
        }
    }
}
