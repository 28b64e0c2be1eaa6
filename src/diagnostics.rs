// Copyright 2025 Cowboy AI, LLC.

//! Diagnostics accumulated during composition
//!
//! Classification problems do not abort a build on the spot. They are
//! collected as [`Diagnostic`] values and attached to the declaration that
//! produced them, so tooling upstream can point at the offending source.

use std::fmt;
use std::sync::Mutex;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{SemanticError, SemanticResult};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational
    Info,
    /// Degraded but usable
    Warning,
    /// Blocks the mutation that caused it
    Error,
}

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Wrong tag type, conflicting trait family, incompatible modifier
    Classification,
    /// The back-end found the registered concept unsatisfiable
    Consistency,
    /// Something referenced could not be found
    Lookup,
    /// Problems with the foundational concept mapping
    Worldview,
}

/// A single notification about a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Category
    pub kind: DiagnosticKind,
    /// Human readable message
    pub message: String,
    /// URN of the originating declaration, when known
    pub declaration: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            declaration: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            declaration: None,
        }
    }

    /// Attach the originating declaration
    pub fn for_declaration(mut self, urn: impl Into<String>) -> Self {
        self.declaration = Some(urn.into());
        self
    }

    /// Whether this diagnostic blocks a build
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}/{:?}] {}", self.severity, self.kind, self.message)?;
        if let Some(urn) = &self.declaration {
            write!(f, " ({urn})")?;
        }
        Ok(())
    }
}

/// Diagnostics grouped by declaration URN, in arrival order
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Mutex<IndexMap<String, Vec<Diagnostic>>>,
}

impl DiagnosticLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record diagnostics against a declaration
    pub fn record<I>(&self, declaration: &str, diagnostics: I) -> SemanticResult<()>
    where
        I: IntoIterator<Item = Diagnostic>,
    {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SemanticError::LockPoisoned("diagnostic log".to_string()))?;
        let slot = entries.entry(declaration.to_string()).or_default();
        for diagnostic in diagnostics {
            if !slot.contains(&diagnostic) {
                slot.push(diagnostic);
            }
        }
        Ok(())
    }

    /// Diagnostics recorded for a declaration
    pub fn for_declaration(&self, declaration: &str) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.get(declaration).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Every recorded diagnostic, flattened in arrival order
    pub fn all(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.values().flatten().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_declaration() {
        let d = Diagnostic::warning(DiagnosticKind::Worldview, "ambiguous")
            .for_declaration("odo:Quality");
        assert_eq!(d.to_string(), "[Warning/Worldview] ambiguous (odo:Quality)");
        assert!(!d.is_error());
    }

    #[test]
    fn test_log_groups_and_deduplicates() {
        let log = DiagnosticLog::new();
        let d = Diagnostic::error(DiagnosticKind::Classification, "bad trait");
        log.record("geo:A", vec![d.clone(), d.clone()]).unwrap();
        log.record("geo:B", vec![Diagnostic::error(DiagnosticKind::Lookup, "missing")])
            .unwrap();

        assert_eq!(log.for_declaration("geo:A"), vec![d]);
        assert_eq!(log.all().len(), 2);
        assert!(log.for_declaration("geo:C").is_empty());
    }
}
