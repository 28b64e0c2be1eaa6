// Copyright 2025 Cowboy AI, LLC.

//! Emergence
//!
//! Some configurations, processes and relationships are not observed
//! directly: they emerge once the observations they are triggered by exist.
//! The [`EmergenceRegistrar`] indexes emergent concepts by their trigger
//! concepts and evaluates trigger expressions against a catalog of
//! observations.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::concept::Concept;
use crate::errors::{SemanticError, SemanticResult};
use crate::observable::Observable;
use crate::semantic_type::SemanticType;

/// Identifier of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationId(Uuid);

impl ObservationId {
    /// Create a new random observation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ObservationId> for Uuid {
    fn from(id: ObservationId) -> Self {
        id.0
    }
}

/// An observable that was observed in some context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Identity
    pub id: ObservationId,
    /// What was observed
    pub observable: Observable,
    /// Name in the context
    pub name: String,
    /// When it was recorded
    pub created_at: DateTime<Utc>,
}

impl Observation {
    /// Observation of an observable, named after it
    pub fn new(observable: Observable) -> Self {
        Self {
            id: ObservationId::new(),
            name: observable.name().to_string(),
            observable,
            created_at: Utc::now(),
        }
    }

    /// Observed concept
    pub fn concept(&self) -> &Concept {
        self.observable.concept()
    }
}

/// Observations available in a context
#[cfg_attr(test, mockall::automock)]
pub trait ObservationCatalog {
    /// Observation of a concept, if one exists
    fn observation_of(&self, concept: &Concept) -> Option<Observation>;
}

/// Observation catalog held in memory, keyed by concept URN
#[derive(Debug, Default)]
pub struct InMemoryObservationCatalog {
    observations: IndexMap<String, Observation>,
}

impl InMemoryObservationCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observation, replacing any previous one of the same concept
    pub fn insert(&mut self, observation: Observation) {
        self.observations
            .insert(observation.concept().urn().to_string(), observation);
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl ObservationCatalog for InMemoryObservationCatalog {
    fn observation_of(&self, concept: &Concept) -> Option<Observation> {
        self.observations.get(concept.urn()).cloned()
    }
}

/// Trigger expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// An observation of this concept
    Observable(Concept),
    /// Any of the operands
    Union(Vec<Trigger>),
    /// All of the operands
    Intersection(Vec<Trigger>),
}

impl Trigger {
    /// Concepts at the leaves of the expression
    pub fn leaves(&self) -> Vec<&Concept> {
        match self {
            Trigger::Observable(concept) => vec![concept],
            Trigger::Union(operands) | Trigger::Intersection(operands) => {
                operands.iter().flat_map(Trigger::leaves).collect()
            }
        }
    }

    fn validate(&self) -> SemanticResult<()> {
        match self {
            Trigger::Observable(_) => Ok(()),
            Trigger::Union(operands) | Trigger::Intersection(operands) if operands.is_empty() => {
                Err(SemanticError::invalid("empty emergence trigger expression"))
            }
            Trigger::Union(operands) | Trigger::Intersection(operands) => {
                operands.iter().try_for_each(Trigger::validate)
            }
        }
    }

    /// Observations satisfying the expression, or `None` when it does not hold
    pub fn evaluate(&self, catalog: &dyn ObservationCatalog) -> Option<Vec<Observation>> {
        match self {
            Trigger::Observable(concept) => catalog.observation_of(concept).map(|o| vec![o]),
            Trigger::Union(operands) => {
                let found: Vec<Observation> = operands
                    .iter()
                    .filter_map(|t| t.evaluate(catalog))
                    .flatten()
                    .collect();
                (!found.is_empty()).then(|| dedup(found))
            }
            Trigger::Intersection(operands) => {
                let mut found = Vec::new();
                for operand in operands {
                    found.extend(operand.evaluate(catalog)?);
                }
                Some(dedup(found))
            }
        }
    }
}

fn dedup(observations: Vec<Observation>) -> Vec<Observation> {
    let mut seen = HashSet::new();
    observations
        .into_iter()
        .filter(|o| seen.insert(o.id))
        .collect()
}

/// An emergent concept and what triggers it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emergence {
    /// Concept that emerges
    pub emergent: Concept,
    /// Trigger expressions; any of them suffices
    pub triggers: Vec<Trigger>,
    /// Namespace the emergence was declared in
    pub namespace: String,
}

impl Emergence {
    /// Observations justifying the emergent concept, empty when it does not emerge
    pub fn matches(&self, catalog: &dyn ObservationCatalog) -> Vec<Observation> {
        let found: Vec<Observation> = self
            .triggers
            .iter()
            .filter_map(|t| t.evaluate(catalog))
            .flatten()
            .collect();
        dedup(found)
    }
}

/// Emergent concepts indexed by trigger concept
#[derive(Debug, Default)]
pub struct EmergenceRegistrar {
    emergent: IndexMap<String, Arc<Emergence>>,
    index: IndexMap<String, Vec<Arc<Emergence>>>,
}

impl EmergenceRegistrar {
    /// Empty registrar
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an emergent concept.
    ///
    /// Abstract concepts never emerge and yield `false`. Registering the same
    /// concept twice is a no-op.
    pub fn register_emergent(
        &mut self,
        concept: &Concept,
        triggers: Vec<Trigger>,
    ) -> SemanticResult<bool> {
        if concept.is_abstract() {
            return Ok(false);
        }
        if self.emergent.contains_key(concept.urn()) {
            return Ok(true);
        }
        if triggers.is_empty() {
            return Err(SemanticError::invalid(format!(
                "no emergence triggers given for {}",
                concept.urn()
            )));
        }
        triggers.iter().try_for_each(Trigger::validate)?;

        let emergence = Arc::new(Emergence {
            emergent: concept.clone(),
            namespace: concept.namespace().to_string(),
            triggers,
        });
        let mut indexed = HashSet::new();
        for leaf in emergence.triggers.iter().flat_map(Trigger::leaves) {
            if indexed.insert(leaf.urn().to_string()) {
                self.index
                    .entry(leaf.urn().to_string())
                    .or_default()
                    .push(emergence.clone());
            }
        }
        debug!("{} emerges from {} trigger concepts", concept.urn(), indexed.len());
        self.emergent
            .insert(concept.urn().to_string(), emergence);
        Ok(true)
    }

    /// Whether a concept is registered as emergent
    pub fn is_emergent(&self, concept: &Concept) -> bool {
        self.emergent.contains_key(concept.urn())
    }

    /// Descriptor of an emergent concept
    pub fn emergence(&self, concept: &Concept) -> Option<&Emergence> {
        self.emergent.get(concept.urn()).map(Arc::as_ref)
    }

    /// Emergent concepts triggered through `trigger`, with the observations
    /// that justify each of them
    pub fn matches(
        &self,
        trigger: &Concept,
        catalog: &dyn ObservationCatalog,
    ) -> Vec<(Concept, Vec<Observation>)> {
        self.index
            .get(trigger.urn())
            .into_iter()
            .flatten()
            .filter_map(|emergence| {
                let found = emergence.matches(catalog);
                (!found.is_empty()).then(|| (emergence.emergent.clone(), found))
            })
            .collect()
    }

    /// Emergent concepts a new observation makes resolvable.
    ///
    /// Processes and configurations already present in the catalog are
    /// left out.
    pub fn emergent_resolvables(
        &self,
        observation: &Observation,
        catalog: &dyn ObservationCatalog,
    ) -> Vec<(Concept, Vec<Observation>)> {
        self.matches(observation.concept(), catalog)
            .into_iter()
            .filter(|(emergent, _)| {
                let singular = emergent.is(SemanticType::Process)
                    || emergent.is(SemanticType::Configuration);
                !(singular && catalog.observation_of(emergent).is_some())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_type::TypeSet;

    fn concept(name: &str, keyword: &str) -> Concept {
        Concept::new("eco", name, SemanticType::types_for_keyword(keyword).unwrap())
    }

    fn observation(concept: &Concept) -> Observation {
        Observation::new(Observable::promote(concept.clone()))
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registrar = EmergenceRegistrar::new();
        let flooding = concept("Flooding", "process");
        let rain = concept("Rain", "process");
        let triggers = vec![Trigger::Observable(rain.clone())];
        assert!(registrar.register_emergent(&flooding, triggers.clone()).unwrap());
        assert!(registrar.register_emergent(&flooding, triggers).unwrap());
        assert!(registrar.is_emergent(&flooding));
        assert_eq!(registrar.index.get(rain.urn()).map(Vec::len), Some(1));
    }

    #[test]
    fn test_abstract_never_emerges() {
        let mut registrar = EmergenceRegistrar::new();
        let vague = Concept::new(
            "eco",
            "Vague",
            TypeSet::of(&[SemanticType::Configuration, SemanticType::Abstract]),
        );
        let rain = concept("Rain", "process");
        let registered = registrar
            .register_emergent(&vague, vec![Trigger::Observable(rain)])
            .unwrap();
        assert!(!registered);
        assert!(!registrar.is_emergent(&vague));
    }

    #[test]
    fn test_empty_expression_is_rejected() {
        let mut registrar = EmergenceRegistrar::new();
        let flooding = concept("Flooding", "process");
        assert!(registrar
            .register_emergent(&flooding, vec![Trigger::Intersection(vec![])])
            .is_err());
        assert!(registrar.register_emergent(&flooding, vec![]).is_err());
    }

    #[test]
    fn test_catalog_lookup_with_mock() {
        let rain = concept("Rain", "process");
        let flooding = concept("Flooding", "process");
        let seen = observation(&rain);
        let returned = seen.clone();

        let mut catalog = MockObservationCatalog::new();
        catalog
            .expect_observation_of()
            .returning(move |c| (c.urn() == "eco:Rain").then(|| returned.clone()));

        let mut registrar = EmergenceRegistrar::new();
        registrar
            .register_emergent(&flooding, vec![Trigger::Observable(rain.clone())])
            .unwrap();
        let found = registrar.matches(&rain, &catalog);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, flooding);
        assert_eq!(found[0].1, vec![seen]);
    }

    #[test]
    fn test_present_process_is_not_resolvable() {
        let rain = concept("Rain", "process");
        let flooding = concept("Flooding", "process");
        let mut registrar = EmergenceRegistrar::new();
        registrar
            .register_emergent(&flooding, vec![Trigger::Observable(rain.clone())])
            .unwrap();

        let mut catalog = InMemoryObservationCatalog::new();
        let trigger = observation(&rain);
        catalog.insert(trigger.clone());
        assert_eq!(registrar.emergent_resolvables(&trigger, &catalog).len(), 1);

        catalog.insert(observation(&flooding));
        assert!(registrar.emergent_resolvables(&trigger, &catalog).is_empty());
    }
}
