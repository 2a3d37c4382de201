//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Missing API keys or unusable configuration. Fatal for the request.
    #[error("{0}")]
    Config(String),

    /// Non-success HTTP status from an AI service. Never retried.
    #[error("{service} API request failed: {status}")]
    Upstream { service: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{0} returned no choices")]
    EmptyCompletion(String),

    /// Malformed strategy payload. Surfaced to the caller verbatim.
    #[error("Failed to parse strategy JSON: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("UI error: {0}")]
    Ui(String),
}

impl DomainError {
    /// True when the caller sent something unusable (maps to HTTP 400).
    pub fn is_client_error(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_carries_status() {
        let err = DomainError::Upstream {
            service: "ChatGPT".to_string(),
            status: 429,
        };
        assert_eq!(err.to_string(), "ChatGPT API request failed: 429");
    }

    #[test]
    fn config_message_is_verbatim() {
        let err = DomainError::Config("API keys are not configured".to_string());
        assert_eq!(err.to_string(), "API keys are not configured");
        assert!(!err.is_client_error());
        assert!(DomainError::Validation("x".into()).is_client_error());
    }
}
