//! Error types for the provider service.

use thiserror::Error;

use crate::client::ClientError;

/// Request-level failures of the provider service.
///
/// Outcomes of API calls made on behalf of a resource are reported as
/// [`Diagnostic`](crate::diagnostics::Diagnostic)s instead; this type covers
/// requests the provider cannot act on at all.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider was asked to manage a resource before `configure` ran.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A stored identifier is not a valid linked account id.
    #[error("Invalid resource id {id:?}: {reason}")]
    InvalidId {
        /// The identifier as stored in state.
        id: String,
        /// Why it could not be converted.
        reason: String,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API client could not be constructed or failed outside a handler.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::NotConfigured(msg)
            | Self::UnknownResource(msg) => msg.clone(),
            Self::InvalidId { id, reason } => format!("{id}: {reason}"),
            Self::Serialization(err) => err.to_string(),
            Self::Client(err) => err.to_string(),
        }
    }

    /// Build an [`ProviderError::InvalidId`] from a failed integer parse.
    pub(crate) fn invalid_id(id: &str, err: std::num::ParseIntError) -> Self {
        Self::InvalidId {
            id: id.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::UnknownResource("newrelic_cloud_aws_link_account".to_string());
        assert_eq!(
            format!("{}", err),
            "Unknown resource type: newrelic_cloud_aws_link_account"
        );

        let err = ProviderError::NotConfigured("call configure first".to_string());
        assert_eq!(
            format!("{}", err),
            "Provider not configured: call configure first"
        );
    }

    #[test]
    fn test_invalid_id_from_parse_error() {
        let parse_err = "abc".parse::<i64>().unwrap_err();
        let err = ProviderError::invalid_id("abc", parse_err);
        assert!(matches!(err, ProviderError::InvalidId { ref id, .. } if id == "abc"));
        assert!(err.to_string().starts_with("Invalid resource id \"abc\""));
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::Configuration("api_key is empty".to_string());
        assert_eq!(err.message(), "api_key is empty");

        let err = ProviderError::Client(ClientError::Unauthorized("bad key".to_string()));
        assert_eq!(err.message(), "unauthorized: bad key");
    }
}
