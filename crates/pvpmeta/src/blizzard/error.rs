//! Error types for upstream game API operations.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the game API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Region or locale rejected at client construction.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Connection, TLS or timeout failure before a status was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// 404: the entity no longer exists or is not visible upstream.
    #[error("Not found (HTTP 404): {path}")]
    NotFound { path: String },

    /// 429 from upstream, after local retries were exhausted.
    #[error("Rate limited (HTTP 429): {path}")]
    RateLimited { path: String },

    /// Any other non-200 status.
    #[error("API error (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    /// The body of a 200 response could not be decoded.
    #[error("Invalid JSON: {message}")]
    Parse { message: String, body: String },
}

impl ApiError {
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// 404s mean "gone or private", never "try again".
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// HTTP status associated with the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Status { status, .. } => Some(*status),
            Self::Parse { .. } => Some(200),
            Self::Config(_) | Self::Transport(_) => None,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Get a short error message suitable for outcome samples and log lines.
pub fn short_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Config(msg) => format!("Config: {}", msg),
        ApiError::Transport(_) => "Network error".to_string(),
        ApiError::NotFound { .. } => "HTTP 404".to_string(),
        ApiError::RateLimited { .. } => "Rate limited".to_string(),
        ApiError::Status { status, body } => {
            if body.chars().count() > 50 {
                let truncated: String = body.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else if body.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, body)
            }
        }
        ApiError::Parse { .. } => "JSON parse error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_helpers() {
        let nf = ApiError::NotFound {
            path: "/profile/wow/character/illidan/foo/equipment".to_string(),
        };
        assert!(nf.is_not_found());
        assert!(!nf.is_rate_limited());
        assert_eq!(nf.status(), Some(404));

        let rl = ApiError::RateLimited {
            path: "/data/wow/media/item/1".to_string(),
        };
        assert!(rl.is_rate_limited());
        assert_eq!(rl.status(), Some(429));

        let transport = ApiError::Transport("timed out".to_string());
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn test_http_error_converts_to_transport() {
        let err: ApiError = HttpError::Timeout("10s".to_string()).into();
        assert!(matches!(err, ApiError::Transport(msg) if msg.contains("timed out")));
    }

    #[test]
    fn test_short_error_message_truncates_long_bodies() {
        let err = ApiError::Status {
            status: 503,
            body: "x".repeat(80),
        };
        let msg = short_error_message(&err);
        assert!(msg.starts_with("HTTP 503: "));
        assert!(msg.ends_with("..."));
        assert_eq!(msg.len(), "HTTP 503: ".len() + 47 + 3);

        let err = ApiError::Status {
            status: 500,
            body: String::new(),
        };
        assert_eq!(short_error_message(&err), "HTTP 500");
    }

    #[test]
    fn test_display_includes_status_and_body() {
        let err = ApiError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 502): bad gateway");
    }
}
