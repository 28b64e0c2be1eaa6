// Copyright 2025 Cowboy AI, LLC.

//! Classification back-end seam
//!
//! The composition core never reasons on its own. It asks a
//! [`ClassificationBackend`] whether one concept subsumes another, whether
//! two are compatible, whether a new concept is satisfiable, and it hands
//! the back-end batches of axioms to store.
//!
//! [`InMemoryBackend`] is a told-hierarchy implementation: subsumption is the
//! closure of asserted sub-class edges and inconsistency is limited to
//! asserted disjointness. It is enough to drive the composition core in
//! tests and in tools that do not need a description-logic reasoner.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::axioms::{ns, Axiom, AxiomBatch, RestrictionKind};
use crate::concept::{split_urn, Concept};
use crate::errors::{SemanticError, SemanticResult};
use crate::semantic_type::{SemanticType, TypeSet};

/// URN of the bottom concept
pub const NOTHING_URN: &str = "owl:Nothing";

/// Subsumption and storage services consumed by the composition core
pub trait ClassificationBackend: Send + Sync {
    /// Concept registered under a URN
    fn get_concept(&self, id: &str) -> Option<Concept>;

    /// The bottom concept
    fn nothing(&self) -> Concept;

    /// Store a batch of axioms; either all of them are applied or none
    fn define(&self, batch: AxiomBatch) -> SemanticResult<()>;

    /// Whether the concept admits at least one instance
    fn satisfiable(&self, concept: &Concept) -> bool;

    /// Whether `general` subsumes `specific`
    fn subsumes(&self, general: &Concept, specific: &Concept) -> bool;

    /// Whether the two concepts may denote the same thing
    fn compatible(&self, a: &Concept, b: &Concept) -> bool;

    /// Family ancestor of a trait; `None` for foundational traits
    fn base_parent_trait(&self, concept: &Concept) -> Option<Concept>;

    /// Restriction targets for a property, inherited ones included, nearest first
    fn restricted(&self, concept: &Concept, property: &str) -> Vec<Concept>;

    /// Restriction targets asserted on the concept itself
    fn direct_restricted(&self, concept: &Concept, property: &str) -> Vec<Concept>;
}

type RestrictionEntry = (String, RestrictionKind, Vec<String>);

#[derive(Debug, Default)]
struct Store {
    concepts: HashMap<String, Concept>,
    parents: HashMap<String, Vec<String>>,
    restrictions: HashMap<String, Vec<RestrictionEntry>>,
    disjoint: HashSet<(String, String)>,
    axioms: usize,
}

impl Store {
    fn ancestors(&self, urn: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([urn.to_string()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(&current) {
                queue.extend(parents.iter().cloned());
            }
            order.push(current);
        }
        order
    }

    fn is_disjoint(&self, a: &str, b: &str) -> bool {
        let left = self.ancestors(a);
        let right = self.ancestors(b);
        left.iter().any(|x| {
            right
                .iter()
                .any(|y| self.disjoint.contains(&(x.clone(), y.clone())))
        })
    }

    fn targets(&self, urn: &str, property: &str) -> Vec<String> {
        self.restrictions
            .get(urn)
            .into_iter()
            .flatten()
            .filter(|(p, _, _)| p == property)
            .flat_map(|(_, _, targets)| targets.iter().cloned())
            .collect()
    }

    fn resolve(&self, urns: Vec<String>) -> Vec<Concept> {
        let mut seen = HashSet::new();
        urns.into_iter()
            .filter(|u| seen.insert(u.clone()))
            .filter_map(|u| self.concepts.get(&u).cloned())
            .collect()
    }
}

/// Told-hierarchy back-end kept in memory
#[derive(Debug)]
pub struct InMemoryBackend {
    core_namespace: String,
    store: RwLock<Store>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new("odo")
    }
}

impl InMemoryBackend {
    /// Create a back-end; concepts in `core_namespace` are foundational
    pub fn new(core_namespace: impl Into<String>) -> Self {
        let mut store = Store::default();
        let nothing = bottom();
        store.concepts.insert(nothing.urn().to_string(), nothing);
        Self {
            core_namespace: core_namespace.into(),
            store: RwLock::new(store),
        }
    }

    fn read(&self) -> SemanticResult<RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| SemanticError::LockPoisoned("classification store".to_string()))
    }

    fn write(&self) -> SemanticResult<RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| SemanticError::LockPoisoned("classification store".to_string()))
    }

    /// Assert that two concepts share no instances
    pub fn declare_disjoint(&self, first: &Concept, second: &Concept) -> SemanticResult<()> {
        let mut batch = AxiomBatch::new();
        batch.push(Axiom::Disjoint {
            first: first.urn().to_string(),
            second: second.urn().to_string(),
        });
        self.define(batch)
    }

    /// Number of registered concepts, the bottom concept included
    pub fn concept_count(&self) -> usize {
        self.read().map(|s| s.concepts.len()).unwrap_or(0)
    }

    /// Number of axioms applied so far
    pub fn axiom_count(&self) -> usize {
        self.read().map(|s| s.axioms).unwrap_or(0)
    }

    /// Asserted parents of a concept
    pub fn parents_of(&self, urn: &str) -> Vec<String> {
        self.read()
            .map(|s| s.parents.get(urn).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn validate(store: &Store, batch: &AxiomBatch) -> SemanticResult<()> {
        let mut declared: HashMap<&str, &TypeSet> = HashMap::new();
        for axiom in batch.axioms() {
            if let Axiom::ClassAssertion { id, types } = axiom {
                if split_urn(id).is_none() {
                    return Err(SemanticError::Backend(format!("malformed concept id {id}")));
                }
                if let Some(existing) = store.concepts.get(id) {
                    if existing.types() != types {
                        return Err(SemanticError::Backend(format!(
                            "{id} is already defined with different semantics"
                        )));
                    }
                }
                declared.insert(id.as_str(), types);
            }
        }
        let known = |urn: &str| store.concepts.contains_key(urn) || declared.contains_key(urn);
        for axiom in batch.axioms() {
            let referenced: Vec<&str> = match axiom {
                Axiom::ClassAssertion { .. } => Vec::new(),
                Axiom::Annotation { id, .. } => vec![id.as_str()],
                Axiom::SubClass { parent, child } => vec![parent.as_str(), child.as_str()],
                Axiom::Restriction { id, targets, .. } => {
                    std::iter::once(id.as_str()).chain(targets.iter().map(String::as_str)).collect()
                }
                Axiom::Disjoint { first, second } => vec![first.as_str(), second.as_str()],
            };
            if let Some(missing) = referenced.into_iter().find(|urn| !known(*urn)) {
                return Err(SemanticError::ConceptNotFound(missing.to_string()));
            }
        }
        Ok(())
    }
}

fn bottom() -> Concept {
    Concept::new("owl", "Nothing", TypeSet::of(&[SemanticType::Nothing]))
}

impl ClassificationBackend for InMemoryBackend {
    fn get_concept(&self, id: &str) -> Option<Concept> {
        self.read().ok()?.concepts.get(id).cloned()
    }

    fn nothing(&self) -> Concept {
        bottom()
    }

    fn define(&self, batch: AxiomBatch) -> SemanticResult<()> {
        let mut store = self.write()?;
        Self::validate(&store, &batch)?;
        store.axioms += batch.len();
        for axiom in batch {
            match axiom {
                Axiom::ClassAssertion { id, types } => {
                    if !store.concepts.contains_key(&id) {
                        let concept = Concept::from_urn(&id, types).ok_or_else(|| {
                            SemanticError::Backend(format!("malformed concept id {id}"))
                        })?;
                        store.concepts.insert(id, concept);
                    }
                }
                Axiom::Annotation { id, property, value } => {
                    if let Some(concept) = store.concepts.remove(&id) {
                        let updated = if property == ns::REFERENCE_NAME {
                            concept.with_reference_name(value)
                        } else {
                            concept.with_metadata(property, value)
                        };
                        store.concepts.insert(id, updated);
                    }
                }
                Axiom::SubClass { parent, child } => {
                    let parents = store.parents.entry(child).or_default();
                    if !parents.contains(&parent) {
                        parents.push(parent);
                    }
                }
                Axiom::Restriction {
                    id,
                    property,
                    kind,
                    targets,
                } => {
                    store
                        .restrictions
                        .entry(id)
                        .or_default()
                        .push((property, kind, targets));
                }
                Axiom::Disjoint { first, second } => {
                    store.disjoint.insert((first.clone(), second.clone()));
                    store.disjoint.insert((second, first));
                }
            }
        }
        debug!("classification store holds {} axioms", store.axioms);
        Ok(())
    }

    fn satisfiable(&self, concept: &Concept) -> bool {
        let Ok(store) = self.read() else {
            return false;
        };
        let ancestors = store.ancestors(concept.urn());
        if ancestors.iter().any(|a| a == NOTHING_URN) {
            return false;
        }
        for (i, a) in ancestors.iter().enumerate() {
            for b in &ancestors[i + 1..] {
                if store.disjoint.contains(&(a.clone(), b.clone())) {
                    return false;
                }
            }
        }
        let mut by_property: HashMap<&str, Vec<&str>> = HashMap::new();
        for ancestor in &ancestors {
            for (property, kind, targets) in store.restrictions.get(ancestor).into_iter().flatten() {
                if *kind == RestrictionKind::Some {
                    by_property
                        .entry(property.as_str())
                        .or_default()
                        .extend(targets.iter().map(String::as_str));
                }
            }
        }
        by_property.values().all(|targets| {
            targets.iter().enumerate().all(|(i, a)| {
                targets[i + 1..]
                    .iter()
                    .all(|b| a == b || !store.is_disjoint(a, b))
            })
        })
    }

    fn subsumes(&self, general: &Concept, specific: &Concept) -> bool {
        if specific.urn() == NOTHING_URN {
            return true;
        }
        self.read()
            .map(|s| s.ancestors(specific.urn()).iter().any(|a| a == general.urn()))
            .unwrap_or(false)
    }

    fn compatible(&self, a: &Concept, b: &Concept) -> bool {
        self.subsumes(a, b) || self.subsumes(b, a)
    }

    fn base_parent_trait(&self, concept: &Concept) -> Option<Concept> {
        if concept.namespace() == self.core_namespace || !concept.types().is_trait() {
            return None;
        }
        let store = self.read().ok()?;
        let mut current = concept.clone();
        loop {
            let parent = store
                .parents
                .get(current.urn())
                .into_iter()
                .flatten()
                .filter_map(|p| store.concepts.get(p))
                .find(|p| p.namespace() != self.core_namespace && p.types().is_trait())
                .cloned();
            match parent {
                Some(p) => current = p,
                None => return Some(current),
            }
        }
    }

    fn restricted(&self, concept: &Concept, property: &str) -> Vec<Concept> {
        let Ok(store) = self.read() else {
            return Vec::new();
        };
        let urns = store
            .ancestors(concept.urn())
            .iter()
            .flat_map(|a| store.targets(a, property))
            .collect();
        store.resolve(urns)
    }

    fn direct_restricted(&self, concept: &Concept, property: &str) -> Vec<Concept> {
        let Ok(store) = self.read() else {
            return Vec::new();
        };
        let urns = store.targets(concept.urn(), property);
        store.resolve(urns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(backend: &InMemoryBackend, urn: &str, keyword: &str, parent: Option<&str>) -> Concept {
        let types = SemanticType::types_for_keyword(keyword).unwrap();
        let mut batch = AxiomBatch::new();
        batch.push(Axiom::ClassAssertion {
            id: urn.to_string(),
            types,
        });
        if let Some(parent) = parent {
            batch.push(Axiom::SubClass {
                parent: parent.to_string(),
                child: urn.to_string(),
            });
        }
        backend.define(batch).unwrap();
        backend.get_concept(urn).unwrap()
    }

    #[test]
    fn test_subsumption_is_transitive() {
        let backend = InMemoryBackend::default();
        let quality = class(&backend, "odo:Quality", "quality", None);
        let biomass = class(&backend, "geo:Biomass", "quantity", Some("odo:Quality"));
        let tree_biomass = class(&backend, "geo:TreeBiomass", "quantity", Some("geo:Biomass"));

        assert!(backend.subsumes(&quality, &tree_biomass));
        assert!(backend.compatible(&tree_biomass, &biomass));
        assert!(!backend.subsumes(&tree_biomass, &quality));
        assert!(backend.subsumes(&quality, &backend.nothing()));
    }

    #[test]
    fn test_batch_is_atomic() {
        let backend = InMemoryBackend::default();
        let before = backend.concept_count();
        let mut batch = AxiomBatch::new();
        batch.push(Axiom::ClassAssertion {
            id: "geo:Lake".into(),
            types: TypeSet::new(),
        });
        batch.push(Axiom::SubClass {
            parent: "geo:Missing".into(),
            child: "geo:Lake".into(),
        });
        let err = backend.define(batch).unwrap_err();
        assert!(matches!(err, SemanticError::ConceptNotFound(urn) if urn == "geo:Missing"));
        assert_eq!(backend.concept_count(), before);
        assert!(backend.get_concept("geo:Lake").is_none());
    }

    #[test]
    fn test_malformed_id_leaves_store_untouched() {
        let backend = InMemoryBackend::default();
        class(&backend, "geo:Lake", "thing", None);
        let (concepts, axioms) = (backend.concept_count(), backend.axiom_count());

        let mut batch = AxiomBatch::new();
        batch.push(Axiom::ClassAssertion {
            id: "geo:River".into(),
            types: SemanticType::types_for_keyword("thing").unwrap(),
        });
        batch.push(Axiom::SubClass {
            parent: "geo:Lake".into(),
            child: "geo:River".into(),
        });
        batch.push(Axiom::ClassAssertion {
            id: "geo:".into(),
            types: TypeSet::new(),
        });
        let err = backend.define(batch).unwrap_err();
        assert!(matches!(err, SemanticError::Backend(message) if message.contains("malformed")));
        assert_eq!(backend.concept_count(), concepts);
        assert_eq!(backend.axiom_count(), axioms);
        assert!(backend.get_concept("geo:River").is_none());
        assert!(!backend.subsumes(
            &backend.get_concept("geo:Lake").unwrap(),
            &Concept::new("geo", "River", TypeSet::new())
        ));
    }

    #[test]
    fn test_redefinition_with_other_types_is_rejected() {
        let backend = InMemoryBackend::default();
        class(&backend, "geo:Lake", "thing", None);
        let mut batch = AxiomBatch::new();
        batch.push(Axiom::ClassAssertion {
            id: "geo:Lake".into(),
            types: SemanticType::types_for_keyword("quality").unwrap(),
        });
        assert!(matches!(backend.define(batch), Err(SemanticError::Backend(_))));
    }

    #[test]
    fn test_base_parent_trait() {
        let backend = InMemoryBackend::default();
        class(&backend, "odo:Attribute", "attribute", None);
        let size = class(&backend, "geo:Size", "attribute", Some("odo:Attribute"));
        let big = class(&backend, "geo:Big", "attribute", Some("geo:Size"));
        let core = backend.get_concept("odo:Attribute").unwrap();

        assert_eq!(backend.base_parent_trait(&big), Some(size.clone()));
        assert_eq!(backend.base_parent_trait(&size), Some(size));
        assert_eq!(backend.base_parent_trait(&core), None);
    }

    #[test]
    fn test_disjoint_restrictions_are_unsatisfiable() {
        let backend = InMemoryBackend::default();
        let forest = class(&backend, "geo:Forest", "thing", None);
        let ocean = class(&backend, "geo:Ocean", "thing", None);
        let biomass = class(&backend, "geo:Biomass", "quantity", None);
        backend.declare_disjoint(&forest, &ocean).unwrap();

        let mut batch = AxiomBatch::new();
        batch.restrict(biomass.urn(), ns::IS_INHERENT_TO, RestrictionKind::Some, &[&forest]);
        batch.push(Axiom::ClassAssertion {
            id: "geo:OddBiomass".into(),
            types: biomass.types().clone(),
        });
        batch.push(Axiom::SubClass {
            parent: biomass.urn().into(),
            child: "geo:OddBiomass".into(),
        });
        batch.restrict("geo:OddBiomass", ns::IS_INHERENT_TO, RestrictionKind::Some, &[&ocean]);
        backend.define(batch).unwrap();

        assert!(backend.satisfiable(&biomass));
        let odd = backend.get_concept("geo:OddBiomass").unwrap();
        assert!(!backend.satisfiable(&odd));
        assert_eq!(backend.restricted(&odd, ns::IS_INHERENT_TO), vec![ocean.clone(), forest]);
        assert_eq!(backend.direct_restricted(&odd, ns::IS_INHERENT_TO), vec![ocean]);
    }

    #[test]
    fn test_annotations_update_metadata() {
        let backend = InMemoryBackend::default();
        class(&backend, "geo:Lake", "thing", None);
        let mut batch = AxiomBatch::new();
        batch.annotate("geo:Lake", ns::REFERENCE_NAME, "lake");
        batch.annotate("geo:Lake", ns::DISPLAY_LABEL, "Lake");
        backend.define(batch).unwrap();
        let lake = backend.get_concept("geo:Lake").unwrap();
        assert_eq!(lake.reference_name(), "lake");
        assert_eq!(lake.display_name(), "Lake");
    }
}
