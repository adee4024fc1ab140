// crates/client/src/error.rs
//! Classified failures produced by the request executor.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use jobtrack_types::ErrorEnvelope;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the client can surface.
///
/// The executor is the only place that builds these from HTTP responses or
/// transport errors; higher layers pass them through untouched.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Validation failed ({code}): {message}")]
    Validation {
        code: String,
        message: String,
        details: Option<Value>,
    },

    #[error("Authentication failed ({code}): {message}")]
    Authentication { code: String, message: String },

    #[error("Not found ({code}): {message}")]
    NotFound {
        code: String,
        message: String,
        details: Option<Value>,
    },

    #[error("Rate limited, retry after {retry_after} seconds ({remaining}/{limit} remaining)")]
    RateLimit {
        code: String,
        message: String,
        retry_after: u64,
        limit: u64,
        remaining: u64,
    },

    #[error("Request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("API error {status} ({code}): {message}")]
    Api {
        code: String,
        message: String,
        status: u16,
        details: Option<Value>,
    },

    #[error("Invalid response body: {message}")]
    InvalidResponse { message: String },

    /// The request could not be built locally; nothing was sent.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A polling wait ran out of budget before the job finished.
    #[error("Job did not finish within {}ms", .after.as_millis())]
    WaitTimeout { after: Duration },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

const UNKNOWN_CODE: &str = "UNKNOWN";

impl Error {
    /// Stable machine-readable code.
    pub fn code(&self) -> &str {
        match self {
            Error::Validation { code, .. }
            | Error::Authentication { code, .. }
            | Error::NotFound { code, .. }
            | Error::RateLimit { code, .. }
            | Error::Api { code, .. } => code,
            Error::Timeout { .. } => "TIMEOUT",
            Error::Network { .. } => "NETWORK_ERROR",
            Error::InvalidResponse { .. } => "INVALID_RESPONSE",
            Error::InvalidRequest { .. } => "INVALID_REQUEST",
            Error::WaitTimeout { .. } => "WAIT_TIMEOUT",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status associated with the failure. Client-side failures that
    /// never got a response report `0`; timeouts report `408`.
    pub fn status(&self) -> u16 {
        match self {
            Error::Validation { .. } => 400,
            Error::Authentication { .. } => 401,
            Error::NotFound { .. } => 404,
            Error::RateLimit { .. } => 429,
            Error::Timeout { .. } => 408,
            Error::Api { status, .. } => *status,
            Error::Network { .. }
            | Error::InvalidResponse { .. }
            | Error::InvalidRequest { .. }
            | Error::WaitTimeout { .. }
            | Error::Config(_) => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Error::Validation { message, .. }
            | Error::Authentication { message, .. }
            | Error::NotFound { message, .. }
            | Error::RateLimit { message, .. }
            | Error::Network { message }
            | Error::Api { message, .. }
            | Error::InvalidResponse { message }
            | Error::InvalidRequest { message } => message.clone(),
            Error::Timeout { .. } | Error::WaitTimeout { .. } | Error::Config(_) => {
                self.to_string()
            }
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            Error::Validation { details, .. }
            | Error::NotFound { details, .. }
            | Error::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Whether an idempotent call that failed this way may be attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout { .. } | Error::Network { .. } | Error::RateLimit { .. } => true,
            Error::Api { status, .. } => (500..600).contains(status),
            Error::Validation { .. }
            | Error::Authentication { .. }
            | Error::NotFound { .. }
            | Error::InvalidResponse { .. }
            | Error::InvalidRequest { .. }
            | Error::WaitTimeout { .. }
            | Error::Config(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Classify a non-2xx response.
    pub fn from_response(status: StatusCode, headers: &HeaderMap, body: &str) -> Self {
        let parsed = ErrorEnvelope::parse(body);
        let (code, message, details) = match parsed {
            Some(err) => (
                err.code.unwrap_or_else(|| UNKNOWN_CODE.to_string()),
                err.message.unwrap_or_else(|| reason(status)),
                err.details,
            ),
            None => (UNKNOWN_CODE.to_string(), reason(status), None),
        };

        match status {
            StatusCode::BAD_REQUEST => Error::Validation {
                code,
                message,
                details,
            },
            StatusCode::UNAUTHORIZED => Error::Authentication { code, message },
            StatusCode::NOT_FOUND => Error::NotFound {
                code,
                message,
                details,
            },
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimit {
                code,
                message,
                retry_after: header_u64(headers, "retry-after").unwrap_or(60),
                limit: header_u64(headers, "x-ratelimit-limit").unwrap_or(0),
                remaining: header_u64(headers, "x-ratelimit-remaining").unwrap_or(0),
            },
            _ => Error::Api {
                code,
                message,
                status: status.as_u16(),
                details,
            },
        }
    }

    /// Classify a transport-level failure from reqwest.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_builder() {
            Error::InvalidRequest {
                message: err.to_string(),
            }
        } else if err.is_timeout() {
            Error::Timeout { after: timeout }
        } else {
            Error::Network {
                message: err.to_string(),
            }
        }
    }
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn classify(status: u16, body: &str) -> Error {
        Error::from_response(StatusCode::from_u16(status).unwrap(), &HeaderMap::new(), body)
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error":{"code":"X","message":"m"}}"#;
        assert!(matches!(classify(400, body), Error::Validation { .. }));
        assert!(matches!(classify(401, body), Error::Authentication { .. }));
        assert!(matches!(classify(404, body), Error::NotFound { .. }));
        assert!(matches!(classify(429, body), Error::RateLimit { .. }));
        assert!(matches!(classify(409, body), Error::Api { status: 409, .. }));
        assert!(matches!(classify(503, body), Error::Api { status: 503, .. }));
    }

    #[test]
    fn test_structured_body_is_preserved() {
        let err = classify(
            400,
            r#"{"error":{"code":"INVALID_TITLE","message":"title is required","details":{"field":"title"}}}"#,
        );
        assert_eq!(err.code(), "INVALID_TITLE");
        assert_eq!(err.message(), "title is required");
        assert_eq!(err.status(), 400);
        assert_eq!(err.details(), Some(&json!({ "field": "title" })));
    }

    #[test]
    fn test_unstructured_body_falls_back_to_reason() {
        let err = classify(502, "<html>upstream down</html>");
        assert_eq!(err.code(), "UNKNOWN");
        assert_eq!(err.message(), "Bad Gateway");
        assert_eq!(err.status(), 502);
        assert!(err.details().is_none());
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("5"));
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("100"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        let err = Error::from_response(StatusCode::TOO_MANY_REQUESTS, &headers, "");
        match err {
            Error::RateLimit {
                retry_after,
                limit,
                remaining,
                ..
            } => {
                assert_eq!(retry_after, 5);
                assert_eq!(limit, 100);
                assert_eq!(remaining, 0);
            }
            other => panic!("expected RateLimit, got {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_header_defaults() {
        match classify(429, "") {
            Error::RateLimit {
                retry_after,
                limit,
                remaining,
                ..
            } => assert_eq!((retry_after, limit, remaining), (60, 0, 0)),
            other => panic!("expected RateLimit, got {other:?}"),
        }
    }

    #[test]
    fn test_retryability() {
        assert!(Error::Timeout { after: Duration::from_secs(1) }.is_retryable());
        assert!(Error::Network { message: "reset".into() }.is_retryable());
        assert!(classify(429, "").is_retryable());
        assert!(classify(500, "").is_retryable());
        assert!(classify(599, "").is_retryable());

        for status in [400, 401, 403, 404, 409, 422] {
            assert!(!classify(status, "").is_retryable(), "status {status}");
        }
        assert!(!Error::Config("bad key".into()).is_retryable());
        assert!(!Error::InvalidResponse { message: "eof".into() }.is_retryable());
    }

    #[test]
    fn test_builder_failure_is_local_and_final() {
        let err = reqwest::Client::new().get("http://[::1").build().unwrap_err();
        assert!(err.is_builder());

        let err = Error::from_transport(err, Duration::from_secs(1));
        assert!(matches!(err, Error::InvalidRequest { .. }), "got {err:?}");
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(err.status(), 0);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_wait_timeout_is_not_a_request_timeout() {
        let err = Error::WaitTimeout { after: Duration::from_millis(250) };
        assert_eq!(err.code(), "WAIT_TIMEOUT");
        assert_eq!(err.status(), 0);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Job did not finish within 250ms");
    }

    #[test]
    fn test_client_side_codes() {
        let timeout = Error::Timeout { after: Duration::from_millis(1500) };
        assert_eq!(timeout.code(), "TIMEOUT");
        assert_eq!(timeout.status(), 408);
        assert_eq!(timeout.to_string(), "Request timed out after 1500ms");

        let net = Error::Network { message: "connection refused".into() };
        assert_eq!(net.code(), "NETWORK_ERROR");
        assert_eq!(net.status(), 0);
        assert_eq!(net.to_string(), "Network error: connection refused");
    }
}
