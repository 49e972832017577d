//! Errors raised by the API client itself (as opposed to payload errors
//! reported inside a successful response).

use thiserror::Error;

/// A failure to complete an API exchange.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The requested object does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The API key was rejected (HTTP 401/403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Non-success HTTP status.
    #[error("NerdGraph request failed with HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Top-level GraphQL errors; the request was not executed.
    #[error("NerdGraph error: {0}")]
    GraphQl(String),

    /// Transport failure from `reqwest`.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not the JSON we expected.
    #[error("invalid NerdGraph response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A successful response lacked a required field.
    #[error("NerdGraph response missing `{0}`")]
    MissingData(&'static str),

    /// The client could not be built from its configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the error means the target object is gone.
    ///
    /// The structured [`ClientError::NotFound`] variant is authoritative.
    /// Other errors fall back to a case-insensitive `"not found"` match on
    /// the message, because NerdGraph reports some lookups of deleted
    /// accounts only as free-text GraphQL errors.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Unauthorized(_) | Self::Config(_) => false,
            other => other.to_string().to_lowercase().contains("not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_structured() {
        let err = ClientError::NotFound("linked account 42".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "linked account 42 not found");
    }

    #[test]
    fn test_not_found_substring_fallback() {
        let err = ClientError::GraphQl("Linked account Not Found for id 42".to_string());
        assert!(err.is_not_found());

        let err = ClientError::GraphQl("Internal server error".to_string());
        assert!(!err.is_not_found());

        let err = ClientError::Http {
            status: 500,
            body: "upstream not found".to_string(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn test_auth_errors_never_mean_not_found() {
        let err = ClientError::Unauthorized("key not found in keystore".to_string());
        assert!(!err.is_not_found());
    }
}
