use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    /// Non-2xx response that carried a `detail` or `message` from the server
    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Unexpected status {0}: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The body did not match the expected schema
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull a human-readable message out of an error body.
    ///
    /// Understands `{"detail": "..."}`, validation lists of the form
    /// `{"detail": [{"msg": "..."}]}`, and `{"message": "..."}`.
    pub fn server_detail(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;

        match value.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => {
                return Some(detail.clone());
            }
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }

        value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => return ApiError::Unauthorized,
            429 => return ApiError::RateLimited,
            _ => {}
        }

        if let Some(detail) = Self::server_detail(body) {
            return ApiError::Rejected {
                status: status.as_u16(),
                detail,
            };
        }

        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::UnexpectedStatus(status.as_u16(), truncated),
        }
    }

    /// HTTP status of a server-side failure, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::AccessDenied(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimited => Some(429),
            ApiError::ServerError(_) => Some(500),
            ApiError::Rejected { status, .. } | ApiError::UnexpectedStatus(status, _) => Some(*status),
            ApiError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The message a notification should show: the server's own detail when
    /// it sent one, the validation message for rejected input, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected { detail, .. } => detail.clone(),
            ApiError::Validation(e) => e.message.clone(),
            _ => fallback.to_string(),
        }
    }
}
