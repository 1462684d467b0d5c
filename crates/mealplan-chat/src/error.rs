//! Error types for the conversation layer.

use mealplan_core::error::MealPlanError;

/// Detail shown when neither the server nor the status line says anything useful.
pub const GENERIC_FAILURE: &str = "Request failed";

/// A failed backend round trip.
///
/// Every variant ends up in the transcript as a single `Error: ...` message;
/// none of them abort the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-2xx status.
    #[error("backend returned HTTP {status}")]
    Http {
        status: u16,
        /// Canonical reason phrase for the status, if known.
        status_text: Option<String>,
        /// `detail` string from the error body, if the server sent one.
        detail: Option<String>,
    },
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("transport error: {0}")]
    Transport(String),
    /// A 2xx response whose body could not be decoded.
    #[error("invalid backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Build an HTTP error from a status and the raw response body.
    ///
    /// Only a string `detail` field is used; FastAPI validation errors carry a
    /// list there and fall back to the status text instead.
    pub fn from_status(status: u16, status_text: Option<&str>, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .filter(|d| !d.trim().is_empty());

        BackendError::Http {
            status,
            status_text: status_text
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            detail,
        }
    }

    /// The best available human-readable detail.
    ///
    /// Server detail, else status text, else [`GENERIC_FAILURE`].
    pub fn user_detail(&self) -> String {
        let detail = match self {
            BackendError::Http {
                status_text,
                detail,
                ..
            } => detail.as_deref().or(status_text.as_deref()),
            BackendError::Transport(msg) | BackendError::Decode(msg) => Some(msg.as_str()),
        };

        match detail {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Errors from setting up the conversation layer.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid configuration: {0}")]
    Config(#[from] MealPlanError),
    #[error("HTTP client error: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Http {
            status: 404,
            status_text: Some("Not Found".to_string()),
            detail: None,
        };
        assert_eq!(err.to_string(), "backend returned HTTP 404");

        let err = BackendError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport error: connection refused");

        let err = BackendError::Decode("expected value".to_string());
        assert_eq!(err.to_string(), "invalid backend response: expected value");
    }

    #[test]
    fn test_from_status_prefers_server_detail() {
        let err = BackendError::from_status(404, Some("Not Found"), r#"{"detail":"Recipe not found."}"#);
        assert_eq!(err.user_detail(), "Recipe not found.");
    }

    #[test]
    fn test_from_status_non_string_detail_uses_status_text() {
        let body = r#"{"detail":[{"loc":["body","user_message"],"msg":"field required"}]}"#;
        let err = BackendError::from_status(422, Some("Unprocessable Entity"), body);
        assert_eq!(err.user_detail(), "Unprocessable Entity");
    }

    #[test]
    fn test_from_status_plain_text_body_uses_status_text() {
        let err = BackendError::from_status(502, Some("Bad Gateway"), "<html>upstream down</html>");
        assert_eq!(err.user_detail(), "Bad Gateway");
    }

    #[test]
    fn test_from_status_without_anything_uses_generic() {
        let err = BackendError::from_status(599, None, "");
        assert_eq!(err.user_detail(), GENERIC_FAILURE);

        let err = BackendError::from_status(500, Some(""), r#"{"detail":"   "}"#);
        assert_eq!(err.user_detail(), GENERIC_FAILURE);
    }

    #[test]
    fn test_transport_detail_falls_back_when_blank() {
        let err = BackendError::Transport("error sending request".to_string());
        assert_eq!(err.user_detail(), "error sending request");

        let err = BackendError::Transport(String::new());
        assert_eq!(err.user_detail(), GENERIC_FAILURE);
    }

    #[test]
    fn test_chat_error_from_config_error() {
        let err: ChatError = MealPlanError::Config("top_n out of range".to_string()).into();
        assert!(matches!(err, ChatError::Config(_)));
        assert!(err.to_string().contains("top_n out of range"));
    }
}
