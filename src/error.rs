//! Error types for product shot generation.

use std::time::Duration;

/// Errors that can occur while preparing or generating a product shot.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Generation was requested before any product image was uploaded.
    #[error("please upload a product image first")]
    MissingSourceImage,

    /// A generation is already in flight for this session.
    #[error("a generation is already in progress")]
    Busy,

    /// The source image could not be read as a data URL or image file.
    #[error("invalid source image: {0}")]
    InvalidSourceImage(String),

    /// A settings value could not be parsed.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The service answered, but no content part carried image data.
    #[error("no image was generated in the response{}", describe_reason(.reason))]
    NoImageReturned {
        /// Block or finish reason reported by the service, if any.
        reason: Option<String>,
    },

    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// The request was rejected as malformed (e.g. unknown model).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g. reading the input or saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_reason(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" ({r})"),
        None => String::new(),
    }
}

impl StudioError {
    /// Returns true if the failure came from the exchange with the service
    /// itself rather than from the caller's input or the response content.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Auth(_)
                | Self::Api { .. }
                | Self::RateLimited { .. }
                | Self::InvalidRequest(_)
                | Self::Network(_)
                | Self::Json(_)
        )
    }

    /// Returns true if this error is likely transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Network(_) => Some(Duration::from_secs(2)),
            Self::Api { status, .. } if *status >= 500 => Some(Duration::from_secs(1)),
            _ => None,
        }
    }
}

/// Result type alias for product studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Maximum length of an error body carried in [`StudioError::Api`].
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Collapses whitespace in an error body and truncates it.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    truncated.push_str("...");
    truncated
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(StudioError::RateLimited { retry_after: None }.is_retryable());
        assert!(StudioError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());

        assert!(!StudioError::Auth("bad key".into()).is_retryable());
        assert!(!StudioError::NoImageReturned { reason: None }.is_retryable());
        assert!(!StudioError::MissingSourceImage.is_retryable());
        assert!(!StudioError::Api {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let rate_limited = StudioError::RateLimited {
            retry_after: Some(Duration::from_secs(60)),
        };
        assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));

        let rate_limited_no_hint = StudioError::RateLimited { retry_after: None };
        assert_eq!(rate_limited_no_hint.retry_after(), None);

        let auth = StudioError::Auth("bad".into());
        assert_eq!(auth.retry_after(), None);
    }

    #[test]
    fn test_transport_classification() {
        assert!(StudioError::Auth("x".into()).is_transport_failure());
        assert!(StudioError::RateLimited { retry_after: None }.is_transport_failure());
        assert!(!StudioError::NoImageReturned { reason: None }.is_transport_failure());
        assert!(!StudioError::MissingSourceImage.is_transport_failure());
        assert!(!StudioError::InvalidSourceImage("x".into()).is_transport_failure());
    }

    #[test]
    fn test_error_display() {
        let err = StudioError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = StudioError::NoImageReturned { reason: None };
        assert_eq!(err.to_string(), "no image was generated in the response");

        let err = StudioError::NoImageReturned {
            reason: Some("finish reason IMAGE_SAFETY".into()),
        };
        assert_eq!(
            err.to_string(),
            "no image was generated in the response (finish reason IMAGE_SAFETY)"
        );
    }

    #[test]
    fn test_sanitize_error_message() {
        assert_eq!(
            sanitize_error_message("  {\n  \"error\":   \"bad\" }\n"),
            "{ \"error\": \"bad\" }"
        );

        let long = "x".repeat(600);
        let sanitized = sanitize_error_message(&long);
        assert_eq!(sanitized.len(), MAX_ERROR_MESSAGE_LEN + 3);
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(reqwest::header::RETRY_AFTER, "17".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(17));

        headers.insert(
            reqwest::header::RETRY_AFTER,
            "Wed, 21 Oct 2015 07:28:00 GMT".parse().unwrap(),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }
}
