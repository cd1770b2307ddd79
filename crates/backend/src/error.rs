//! Errors returned by the backend client.

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend rejected the bearer token, or no token was sent.
    #[error("Unauthorized")]
    Unauthorized,

    /// The token is valid but lacks permission for the resource.
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status. `message` is the backend's own
    /// explanation when it sent one.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the response body.
        message: String,
    },

    /// The configured base URL cannot carry path segments.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// Whether the failure means the user's session is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the backend considered the request itself invalid (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status: 400..=499, .. })
    }

    /// Text safe to show in a flash notification.
    ///
    /// Validation messages from the backend are passed through; transport
    /// and server failures collapse to a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Please sign in again.".to_string(),
            Self::Forbidden => "You do not have permission to do that.".to_string(),
            Self::NotFound(_) => "That item could not be found.".to_string(),
            Self::RateLimited(_) => "Too many requests. Please try again shortly.".to_string(),
            Self::Status {
                status: 400..=499,
                message,
            } if !message.is_empty() => message.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"message": ...}`, ASP.NET problem details
/// (`{"title": ..., "errors": {...}}`) and plain-text bodies.
pub(crate) fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return trimmed.chars().take(200).collect();
    };

    if let Some(text) = value.as_str() {
        return text.to_string();
    }

    if let Some(errors) = value.get("errors").and_then(serde_json::Value::as_object) {
        let first = errors
            .values()
            .filter_map(serde_json::Value::as_array)
            .flatten()
            .find_map(serde_json::Value::as_str);
        if let Some(first) = first {
            return first.to_string();
        }
    }

    ["message", "detail", "title", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_formats() {
        assert_eq!(extract_message(r#"{"message":"Email taken"}"#), "Email taken");
        assert_eq!(
            extract_message(r#"{"title":"One or more validation errors occurred.","errors":{"Password":["Too short"]}}"#),
            "Too short"
        );
        assert_eq!(extract_message("\"Invalid credentials\""), "Invalid credentials");
        assert_eq!(extract_message("Bad things"), "Bad things");
        assert_eq!(extract_message("{}"), "");
    }

    #[test]
    fn test_user_message_hides_server_errors() {
        let server = BackendError::Status {
            status: 500,
            message: "NullReferenceException at ...".to_string(),
        };
        assert_eq!(server.user_message(), "Something went wrong. Please try again.");

        let validation = BackendError::Status {
            status: 400,
            message: "Quantity must be positive".to_string(),
        };
        assert_eq!(validation.user_message(), "Quantity must be positive");
        assert!(validation.is_client_error());
    }
}
