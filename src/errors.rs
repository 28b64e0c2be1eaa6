// Copyright 2025 Cowboy AI, LLC.

//! Error types for semantic composition

use thiserror::Error;

use crate::concept::Concept;
use crate::diagnostics::Diagnostic;

/// Errors that can occur while composing or classifying concepts
#[derive(Debug, Clone, Error)]
pub enum SemanticError {
    /// A concept URN could not be resolved in the classification back-end
    #[error("Concept not found: {0}")]
    ConceptNotFound(String),

    /// A declaration URN could not be resolved by any declaration source
    #[error("Declaration not found: {0}")]
    DeclarationNotFound(String),

    /// No foundational concept is registered for a tag set
    #[error("No core type registered for {0}")]
    MissingCoreType(String),

    /// Malformed request (caller error, never accumulated)
    #[error("Invalid composition request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected
        reason: String,
    },

    /// Classification errors were accumulated while building
    #[error("Validation failed with {} error(s)", diagnostics.len())]
    ValidationFailed {
        /// Every diagnostic collected during the build
        diagnostics: Vec<Diagnostic>,
        /// Best-effort concept, registered without the rejected mutations
        partial: Option<Box<Concept>>,
    },

    /// The classification back-end refused an operation
    #[error("Classification back-end error: {0}")]
    Backend(String),

    /// A shared lock was poisoned by a panicking writer
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for semantic operations
pub type SemanticResult<T> = Result<T, SemanticError>;

impl From<serde_json::Error> for SemanticError {
    fn from(err: serde_json::Error) -> Self {
        SemanticError::SerializationError(err.to_string())
    }
}

impl SemanticError {
    /// Create an invalid request error
    pub fn invalid(reason: impl Into<String>) -> Self {
        SemanticError::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Check if this is a lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SemanticError::ConceptNotFound(_)
                | SemanticError::DeclarationNotFound(_)
                | SemanticError::MissingCoreType(_)
        )
    }

    /// Check if this is a validation failure
    pub fn is_validation_error(&self) -> bool {
        matches!(self, SemanticError::ValidationFailed { .. })
    }

    /// Diagnostics carried by a validation failure, empty otherwise
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            SemanticError::ValidationFailed { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }

    /// Best-effort concept carried by a validation failure
    pub fn partial(&self) -> Option<&Concept> {
        match self {
            SemanticError::ValidationFailed { partial, .. } => partial.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticKind, Severity};

    /// Test error display messages
    ///
    /// ```mermaid
    /// graph TD
    ///     A[SemanticError] -->|Display| B[Error Message]
    ///     A -->|Predicates| C[is_not_found / is_validation_error]
    /// ```
    #[test]
    fn test_error_display_messages() {
        let err = SemanticError::ConceptNotFound("geo:Forest".to_string());
        assert_eq!(err.to_string(), "Concept not found: geo:Forest");

        let err = SemanticError::DeclarationNotFound("geo:Lake".to_string());
        assert_eq!(err.to_string(), "Declaration not found: geo:Lake");

        let err = SemanticError::invalid("empty concept name");
        assert_eq!(
            err.to_string(),
            "Invalid composition request: empty concept name"
        );

        let err = SemanticError::ValidationFailed {
            diagnostics: vec![
                Diagnostic::error(DiagnosticKind::Classification, "first"),
                Diagnostic::error(DiagnosticKind::Classification, "second"),
            ],
            partial: None,
        };
        assert_eq!(err.to_string(), "Validation failed with 2 error(s)");
    }

    #[test]
    fn test_error_predicates() {
        assert!(SemanticError::MissingCoreType("Quality".into()).is_not_found());
        assert!(!SemanticError::Backend("down".into()).is_not_found());

        let err = SemanticError::ValidationFailed {
            diagnostics: vec![Diagnostic::error(DiagnosticKind::Classification, "x")],
            partial: None,
        };
        assert!(err.is_validation_error());
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].severity, Severity::Error);
        assert!(err.partial().is_none());
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SemanticError = parse.unwrap_err().into();
        assert!(matches!(err, SemanticError::SerializationError(_)));
    }
}
