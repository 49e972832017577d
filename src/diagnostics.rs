//! Diagnostics returned to the host for display to the operator.

use serde::{Deserialize, Serialize};

use crate::client::PayloadError;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents the operation from completing.
    Error,
    /// A warning that doesn't prevent the operation but should be addressed.
    Warning,
}

/// A diagnostic message from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl From<&PayloadError> for Diagnostic {
    /// Payload errors keep the API's wording: `"<type> <message>"`.
    fn from(err: &PayloadError) -> Self {
        Diagnostic::error(format!("{} {}", err.error_type, err.message))
    }
}

/// An ordered accumulator of diagnostics for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Append one error diagnostic per payload error.
    pub fn extend_payload_errors(&mut self, errors: &[PayloadError]) {
        self.0.extend(errors.iter().map(Diagnostic::from));
    }

    /// Whether any accumulated diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    /// Whether nothing was accumulated.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of accumulated diagnostics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the accumulated diagnostics.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Consume the accumulator.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self(diagnostics)
    }
}

impl From<Diagnostics> for Vec<Diagnostic> {
    fn from(diagnostics: Diagnostics) -> Self {
        diagnostics.0
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Invalid configuration")
            .with_detail("The value must be positive")
            .with_attribute("account_id");

        assert_eq!(err.severity, DiagnosticSeverity::Error);
        assert_eq!(err.summary, "Invalid configuration");
        assert_eq!(err.detail, Some("The value must be positive".to_string()));
        assert_eq!(err.attribute, Some("account_id".to_string()));
        assert!(err.is_error());
        assert!(!Diagnostic::warning("heads up").is_error());
    }

    #[test]
    fn test_payload_error_summary() {
        let payload = PayloadError::new("ERR_INVALID_DATA", "Tenant id is malformed");
        let diag = Diagnostic::from(&payload);
        assert_eq!(diag.summary, "ERR_INVALID_DATA Tenant id is malformed");
        assert!(diag.is_error());
    }

    #[test]
    fn test_accumulator() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        assert!(!diags.has_errors());

        diags.push(Diagnostic::warning("only a warning"));
        assert!(!diags.has_errors());

        diags.extend_payload_errors(&[
            PayloadError::new("ERR_A", "first"),
            PayloadError::new("ERR_B", "second"),
        ]);
        assert_eq!(diags.len(), 3);
        assert!(diags.has_errors());

        let summaries: Vec<_> = diags.into_iter().map(|d| d.summary).collect();
        assert_eq!(summaries, vec!["only a warning", "ERR_A first", "ERR_B second"]);
    }
}
