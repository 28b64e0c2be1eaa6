// Copyright 2025 Cowboy AI, LLC.

//! Concepts
//!
//! A [`Concept`] is a classified node of the knowledge base: a namespace
//! qualified URN, a set of semantic tags, and string metadata written as
//! annotations when the concept was registered. Concepts are values; the
//! classification back-end owns the authoritative copy and hands out clones.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::axioms::ns;
use crate::semantic_type::{SemanticType, TypeSet};

/// A classified concept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    urn: String,
    namespace: String,
    name: String,
    types: TypeSet,
    collective: bool,
    reference_name: String,
    metadata: BTreeMap<String, String>,
}

impl Concept {
    /// Create a concept in a namespace
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, types: TypeSet) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        Self {
            urn: format!("{namespace}:{name}"),
            reference_name: default_reference_name(&namespace, &name),
            namespace,
            name,
            types,
            collective: false,
            metadata: BTreeMap::new(),
        }
    }

    /// Create a concept from a `namespace:name` URN
    pub fn from_urn(urn: &str, types: TypeSet) -> Option<Self> {
        let (namespace, name) = split_urn(urn)?;
        Some(Self::new(namespace, name, types))
    }

    /// Set/replace the reference name
    pub fn with_reference_name(mut self, reference_name: impl Into<String>) -> Self {
        self.reference_name = reference_name.into();
        self
    }

    /// Set one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Same concept, seen as a collective (each-of) observable
    pub fn with_collective(mut self, collective: bool) -> Self {
        self.collective = collective;
        self
    }

    /// `namespace:name`
    pub fn urn(&self) -> &str {
        &self.urn
    }

    /// Namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Name within the namespace
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semantic tags
    pub fn types(&self) -> &TypeSet {
        &self.types
    }

    /// Whether the concept carries a tag
    pub fn is(&self, tag: SemanticType) -> bool {
        self.types.contains(tag)
    }

    /// Abstract concepts cannot be observed directly
    pub fn is_abstract(&self) -> bool {
        self.types.is_abstract()
    }

    /// Collective flag
    pub fn is_collective(&self) -> bool {
        self.collective
    }

    /// Identifier-safe name, unique within the knowledge base
    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }

    /// One metadata entry
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Every metadata entry
    pub fn metadata_map(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Label for humans
    pub fn display_name(&self) -> &str {
        self.metadata(ns::DISPLAY_LABEL).unwrap_or(&self.name)
    }

    /// Name without any disambiguating suffix
    pub fn clean_id(&self) -> &str {
        self.metadata(ns::RDFS_LABEL).unwrap_or(&self.name)
    }

    /// Main concept a composite was derived from
    pub fn core_observable(&self) -> Option<&str> {
        self.metadata(ns::CORE_OBSERVABLE)
    }

    /// Declaration URN this concept was built from
    pub fn definition(&self) -> Option<&str> {
        self.metadata(ns::CONCEPT_DEFINITION)
    }

    /// Whether this concept was composed from another
    pub fn is_composite(&self) -> bool {
        self.core_observable().is_some()
    }

    /// snake_case form of the clean id
    pub fn code_name(&self) -> String {
        snake_case(self.clean_id())
    }
}

impl PartialEq for Concept {
    fn eq(&self, other: &Self) -> bool {
        self.urn == other.urn && self.collective == other.collective
    }
}

impl Eq for Concept {}

impl Hash for Concept {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.urn.hash(state);
        self.collective.hash(state);
    }
}

impl PartialOrd for Concept {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Concept {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.urn, self.collective).cmp(&(&other.urn, other.collective))
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.collective {
            write!(f, "each {}", self.urn)
        } else {
            f.write_str(&self.urn)
        }
    }
}

/// Split `namespace:name`
pub fn split_urn(urn: &str) -> Option<(&str, &str)> {
    let (namespace, name) = urn.split_once(':')?;
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some((namespace, name))
}

/// Reference name assigned to a concept that was not composed
pub fn default_reference_name(namespace: &str, name: &str) -> String {
    format!("{}_{}", namespace.replace(['.', '-'], "_"), snake_case(name))
}

/// `BiomassDensity` -> `biomass_density`
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}
