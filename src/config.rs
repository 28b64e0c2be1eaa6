// Copyright 2025 Cowboy AI, LLC.

//! Runtime configuration for the semantic core

use serde::{Deserialize, Serialize};

use crate::errors::SemanticResult;

/// Configuration shared by every builder created from a worldview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticsConfig {
    /// Namespace holding the foundational concepts
    pub core_namespace: String,

    /// Ask the back-end for satisfiability after each registration
    pub check_satisfiability: bool,

    /// Warn about declarable tags with no foundational concept
    pub warn_on_missing_core_types: bool,

    /// Capacity of the declaration to concept cache
    pub declaration_cache_size: usize,
}

impl Default for SemanticsConfig {
    fn default() -> Self {
        Self {
            core_namespace: "odo".to_string(),
            check_satisfiability: true,
            warn_on_missing_core_types: true,
            declaration_cache_size: 256,
        }
    }
}

impl SemanticsConfig {
    /// Parse a configuration from JSON, filling gaps with defaults
    pub fn from_json(json: &str) -> SemanticResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether a namespace is the foundational one
    pub fn is_core_namespace(&self, namespace: &str) -> bool {
        self.core_namespace == namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SemanticsConfig::default();
        assert_eq!(config.core_namespace, "odo");
        assert!(config.check_satisfiability);
        assert!(config.is_core_namespace("odo"));
        assert!(!config.is_core_namespace("geo"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            SemanticsConfig::from_json(r#"{ "check_satisfiability": false }"#).unwrap();
        assert!(!config.check_satisfiability);
        assert_eq!(config.declaration_cache_size, 256);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        assert!(SemanticsConfig::from_json("[").is_err());
    }
}
