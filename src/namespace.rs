// Copyright 2025 Cowboy AI, LLC.

//! Namespace registry
//!
//! Each namespace owns an intern table mapping canonical reference names to
//! the URNs minted for them, plus the declarations of concepts registered in
//! it. Lookup-or-create for a namespace runs under that namespace's lock, so
//! a canonical reference name yields at most one concept.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::backend::ClassificationBackend;
use crate::concept::{split_urn, Concept};
use crate::declaration::Declaration;
use crate::errors::{SemanticError, SemanticResult};

/// Intern table of a single namespace
#[derive(Debug, Default)]
pub struct NamespaceTable {
    by_reference: HashMap<String, String>,
    declarations: HashMap<String, Declaration>,
}

impl NamespaceTable {
    /// URN interned under a reference name
    pub fn lookup(&self, reference_name: &str) -> Option<&str> {
        self.by_reference.get(reference_name).map(String::as_str)
    }

    /// Number of interned concepts
    pub fn len(&self) -> usize {
        self.by_reference.len()
    }

    /// Whether nothing was interned yet
    pub fn is_empty(&self) -> bool {
        self.by_reference.is_empty()
    }
}

/// Per-namespace intern tables
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
    namespaces: RwLock<HashMap<String, Arc<Mutex<NamespaceTable>>>>,
}

impl NamespaceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, namespace: &str) -> SemanticResult<Arc<Mutex<NamespaceTable>>> {
        {
            let namespaces = self
                .namespaces
                .read()
                .map_err(|_| SemanticError::LockPoisoned("namespace registry".to_string()))?;
            if let Some(table) = namespaces.get(namespace) {
                return Ok(table.clone());
            }
        }
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| SemanticError::LockPoisoned("namespace registry".to_string()))?;
        Ok(namespaces.entry(namespace.to_string()).or_default().clone())
    }

    /// Return the concept interned under `reference_name`, or mint a URN from
    /// `display_id` and let `create` register it.
    ///
    /// The namespace stays locked from lookup to insertion. `create` receives
    /// the minted URN and must leave the concept defined in the back-end.
    pub fn intern<F>(
        &self,
        namespace: &str,
        reference_name: &str,
        display_id: &str,
        backend: &dyn ClassificationBackend,
        create: F,
    ) -> SemanticResult<Concept>
    where
        F: FnOnce(&str) -> SemanticResult<Concept>,
    {
        let table = self.table(namespace)?;
        let mut table = table
            .lock()
            .map_err(|_| SemanticError::LockPoisoned(format!("namespace {namespace}")))?;

        if let Some(urn) = table.lookup(reference_name) {
            if let Some(existing) = backend.get_concept(urn) {
                debug!("intern hit for {} in {}: {}", reference_name, namespace, urn);
                return Ok(existing);
            }
        }

        let urn = mint_urn(namespace, display_id, &table, backend);
        let concept = create(&urn)?;
        table
            .by_reference
            .insert(reference_name.to_string(), concept.urn().to_string());
        Ok(concept)
    }

    /// URN interned under a reference name, if any
    pub fn lookup(&self, namespace: &str, reference_name: &str) -> SemanticResult<Option<String>> {
        let table = self.table(namespace)?;
        let table = table
            .lock()
            .map_err(|_| SemanticError::LockPoisoned(format!("namespace {namespace}")))?;
        Ok(table.lookup(reference_name).map(str::to_string))
    }

    /// Keep the declaration a concept was built from
    pub fn record_declaration(&self, urn: &str, declaration: Declaration) -> SemanticResult<()> {
        let (namespace, _) =
            split_urn(urn).ok_or_else(|| SemanticError::invalid(format!("malformed urn {urn}")))?;
        let table = self.table(namespace)?;
        let mut table = table
            .lock()
            .map_err(|_| SemanticError::LockPoisoned(format!("namespace {namespace}")))?;
        table.declarations.insert(urn.to_string(), declaration);
        Ok(())
    }

    /// Declaration recorded for a concept
    pub fn declaration(&self, urn: &str) -> Option<Declaration> {
        let (namespace, _) = split_urn(urn)?;
        let table = self.table(namespace).ok()?;
        let table = table.lock().ok()?;
        table.declarations.get(urn).cloned()
    }

    /// Number of concepts interned in a namespace
    pub fn interned_count(&self, namespace: &str) -> usize {
        self.table(namespace)
            .ok()
            .and_then(|t| t.lock().ok().map(|t| t.len()))
            .unwrap_or(0)
    }
}

fn mint_urn(
    namespace: &str,
    display_id: &str,
    table: &NamespaceTable,
    backend: &dyn ClassificationBackend,
) -> String {
    let taken = |urn: &str| {
        backend.get_concept(urn).is_some() || table.by_reference.values().any(|u| u == urn)
    };
    let base = format!("{namespace}:{display_id}");
    if !taken(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axioms::{Axiom, AxiomBatch};
    use crate::backend::InMemoryBackend;
    use crate::semantic_type::{SemanticType, TypeSet};

    fn create<'a>(backend: &'a InMemoryBackend) -> impl Fn(&str) -> SemanticResult<Concept> + 'a {
        move |urn: &str| {
            let mut batch = AxiomBatch::new();
            batch.push(Axiom::ClassAssertion {
                id: urn.to_string(),
                types: TypeSet::of(&[SemanticType::Quality]),
            });
            backend.define(batch)?;
            backend
                .get_concept(urn)
                .ok_or_else(|| SemanticError::ConceptNotFound(urn.to_string()))
        }
    }

    #[test]
    fn test_intern_returns_existing() {
        let backend = InMemoryBackend::default();
        let registry = NamespaceRegistry::new();
        let first = registry
            .intern("geo", "geo_dry_soil", "DrySoil", &backend, create(&backend))
            .unwrap();
        let second = registry
            .intern("geo", "geo_dry_soil", "DrySoil", &backend, |_| {
                Err(SemanticError::invalid("must not be called"))
            })
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.interned_count("geo"), 1);
    }

    #[test]
    fn test_display_id_collision_is_suffixed() {
        let backend = InMemoryBackend::default();
        let registry = NamespaceRegistry::new();
        let first = registry
            .intern("geo", "ref_a", "Moisture", &backend, create(&backend))
            .unwrap();
        let second = registry
            .intern("geo", "ref_b", "Moisture", &backend, create(&backend))
            .unwrap();
        let third = registry
            .intern("geo", "ref_c", "Moisture", &backend, create(&backend))
            .unwrap();
        assert_eq!(first.urn(), "geo:Moisture");
        assert_eq!(second.urn(), "geo:Moisture_2");
        assert_eq!(third.urn(), "geo:Moisture_3");
    }

    #[test]
    fn test_failed_creation_is_not_interned() {
        let backend = InMemoryBackend::default();
        let registry = NamespaceRegistry::new();
        let result = registry.intern("geo", "ref", "Thing", &backend, |_| {
            Err(SemanticError::Backend("rejected".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(registry.lookup("geo", "ref").unwrap(), None);
    }

    #[test]
    fn test_declarations_by_urn() {
        let registry = NamespaceRegistry::new();
        let declaration = Declaration::named("geo", "Forest", TypeSet::new());
        registry
            .record_declaration("geo:Forest", declaration.clone())
            .unwrap();
        assert_eq!(registry.declaration("geo:Forest"), Some(declaration));
        assert_eq!(registry.declaration("geo:Lake"), None);
        assert!(registry.record_declaration("bad", Declaration::default()).is_err());
    }

    #[test]
    fn test_concurrent_intern_creates_once() {
        let backend = Arc::new(InMemoryBackend::default());
        let registry = Arc::new(NamespaceRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = backend.clone();
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry
                        .intern("geo", "geo_shared", "Shared", backend.as_ref(), create(&backend))
                        .unwrap()
                })
            })
            .collect();
        let urns: Vec<String> = handles
            .into_iter()
            .map(|h| h.join().unwrap().urn().to_string())
            .collect();
        assert!(urns.iter().all(|u| u == "geo:Shared"));
        assert_eq!(registry.interned_count("geo"), 1);
    }
}
