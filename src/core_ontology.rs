// Copyright 2025 Cowboy AI, LLC.

//! Core type registry
//!
//! Each fundamental semantic tag is backed by exactly one foundational
//! concept in the knowledge base (`odo:Process`, `odo:Length`, ...). Every
//! new concept is placed under the foundational concept of its
//! representative tag. A worldview may override the defaults by declaring
//! its own concepts as core peers.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::axioms::trait_property;
use crate::backend::ClassificationBackend;
use crate::concept::{snake_case, Concept};
use crate::declaration::ConceptStatement;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::errors::{SemanticError, SemanticResult};
use crate::semantic_type::{
    representative_core_type, SemanticType, TypeSet, DECLARABLE_TYPES,
};

/// Local name of the default foundational concept for a tag
pub fn default_core_name(tag: SemanticType) -> Option<&'static str> {
    use SemanticType::*;
    let name = match tag {
        Process => "Process",
        Subject => "Subject",
        Event => "Event",
        Functional => "FunctionalRelationship",
        Structural => "StructuralRelationship",
        Relationship => "Relationship",
        Extensive => "ExtensivePhysicalProperty",
        Intensive => "IntensivePhysicalProperty",
        Identity => "Identity",
        Attribute => "Attribute",
        Realm => "Realm",
        Ordering => "Ordering",
        Role => "Role",
        Configuration => "Configuration",
        Class => "EnumerableQuality",
        Quantity => "ContinuousNumericallyQuantifiableQuality",
        Domain => "Domain",
        Energy => "Energy",
        Entropy => "Entropy",
        Length => "Length",
        Mass => "Mass",
        Volume => "Volume",
        Weight => "Weight",
        Money | MonetaryValue => "MonetaryValue",
        Duration => "Duration",
        Area => "Area",
        Acceleration => "Acceleration",
        Priority => "Priority",
        ElectricPotential => "ElectricPotential",
        Charge => "Charge",
        Resistance => "Resistance",
        Resistivity => "Resistivity",
        Pressure => "Pressure",
        Angle => "Angle",
        Velocity => "Speed",
        Temperature => "Temperature",
        Viscosity => "Viscosity",
        Agent => "Agent",
        Uncertainty => "Uncertainty",
        Probability => "Probability",
        Proportion => "Proportion",
        Numerosity => "Numerosity",
        Distance => "Distance",
        Ratio => "Ratio",
        Value => "Value",
        Change => "Change",
        Occurrence => "Occurrence",
        Presence => "Presence",
        Extent => "Extent",
        _ => return None,
    };
    Some(name)
}

/// Tags with a default foundational concept
pub const CORE_TAGS: &[SemanticType] = &[
    SemanticType::Process,
    SemanticType::Subject,
    SemanticType::Event,
    SemanticType::Functional,
    SemanticType::Structural,
    SemanticType::Relationship,
    SemanticType::Extensive,
    SemanticType::Intensive,
    SemanticType::Identity,
    SemanticType::Attribute,
    SemanticType::Realm,
    SemanticType::Ordering,
    SemanticType::Role,
    SemanticType::Configuration,
    SemanticType::Class,
    SemanticType::Quantity,
    SemanticType::Domain,
    SemanticType::Energy,
    SemanticType::Entropy,
    SemanticType::Length,
    SemanticType::Mass,
    SemanticType::Volume,
    SemanticType::Weight,
    SemanticType::Money,
    SemanticType::Duration,
    SemanticType::Area,
    SemanticType::Acceleration,
    SemanticType::Priority,
    SemanticType::ElectricPotential,
    SemanticType::Charge,
    SemanticType::Resistance,
    SemanticType::Resistivity,
    SemanticType::Pressure,
    SemanticType::Angle,
    SemanticType::Velocity,
    SemanticType::Temperature,
    SemanticType::Viscosity,
    SemanticType::Agent,
    SemanticType::Uncertainty,
    SemanticType::Probability,
    SemanticType::Proportion,
    SemanticType::Numerosity,
    SemanticType::Distance,
    SemanticType::Ratio,
    SemanticType::Value,
    SemanticType::Change,
    SemanticType::Occurrence,
    SemanticType::Presence,
    SemanticType::Extent,
];

/// Tags carried by the default foundational concept for a tag
pub fn core_types(tag: SemanticType) -> TypeSet {
    use SemanticType::*;
    match tag {
        Functional | Structural => SemanticType::types_for_keyword("relationship")
            .unwrap_or_default()
            .with(tag),
        Extensive | Intensive => TypeSet::of(&[Quality, tag, Observable, Quantifiable]),
        _ => SemanticType::types_for_keyword(&snake_case(&tag.to_string()))
            .unwrap_or_else(|| TypeSet::of(&[tag])),
    }
}

/// Outcome of validating the foundational concepts of a worldview
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootDomainReport {
    /// Tag each core peer was assigned to
    pub assignments: BTreeMap<SemanticType, String>,
    /// Problems found; none of them prevent loading
    pub warnings: Vec<Diagnostic>,
}

/// Registry of foundational concepts
pub struct CoreOntology {
    core_namespace: String,
    backend: Arc<dyn ClassificationBackend>,
    overrides: RwLock<HashMap<SemanticType, Concept>>,
}

impl std::fmt::Debug for CoreOntology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreOntology")
            .field("core_namespace", &self.core_namespace)
            .finish_non_exhaustive()
    }
}

impl CoreOntology {
    /// Registry over a back-end, with defaults in `core_namespace`
    pub fn new(core_namespace: impl Into<String>, backend: Arc<dyn ClassificationBackend>) -> Self {
        Self {
            core_namespace: core_namespace.into(),
            backend,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Namespace of the default foundational concepts
    pub fn core_namespace(&self) -> &str {
        &self.core_namespace
    }

    /// URN of the default foundational concept for a tag
    pub fn default_core_id(&self, tag: SemanticType) -> Option<String> {
        default_core_name(tag).map(|name| format!("{}:{}", self.core_namespace, name))
    }

    /// Statements defining every default foundational concept
    pub fn core_statements(&self) -> Vec<ConceptStatement> {
        CORE_TAGS
            .iter()
            .filter_map(|&tag| {
                let name = default_core_name(tag)?;
                Some(ConceptStatement::new(
                    self.core_namespace.clone(),
                    name,
                    core_types(tag),
                ))
            })
            .collect()
    }

    /// Foundational concept to place a concept with these tags under.
    ///
    /// `Ok(None)` when no tag has a representative. Runtime overrides win
    /// over the default table; a default id missing from the back-end is a
    /// lookup error.
    pub fn get_core_type(&self, types: &TypeSet) -> SemanticResult<Option<Concept>> {
        if types.contains(SemanticType::Nothing) {
            return Ok(Some(self.backend.nothing()));
        }
        let Some(tag) = representative_core_type(types) else {
            return Ok(None);
        };
        {
            let overrides = self
                .overrides
                .read()
                .map_err(|_| SemanticError::LockPoisoned("core type overrides".to_string()))?;
            if let Some(concept) = overrides.get(&tag) {
                return Ok(Some(concept.clone()));
            }
        }
        match self.default_core_id(tag) {
            Some(id) => self
                .backend
                .get_concept(&id)
                .map(Some)
                .ok_or(SemanticError::MissingCoreType(id)),
            None => Ok(None),
        }
    }

    /// Register a concept as the foundational concept of its representative tag
    pub fn set_as_core_type(&self, concept: &Concept) -> SemanticResult<Option<SemanticType>> {
        let Some(tag) = representative_core_type(concept.types()) else {
            warn!("{} has no representative tag and cannot be a core type", concept.urn());
            return Ok(None);
        };
        let mut overrides = self
            .overrides
            .write()
            .map_err(|_| SemanticError::LockPoisoned("core type overrides".to_string()))?;
        debug!("{} registered as core type for {}", concept.urn(), tag);
        overrides.insert(tag, concept.clone());
        Ok(Some(tag))
    }

    /// Check the foundational concepts declared by a worldview.
    ///
    /// Ambiguous, unmapped and reassigned declarations are reported as
    /// warnings; so are declarable tags nobody stands for.
    pub fn validate_root_domain(
        &self,
        statements: &[ConceptStatement],
        warn_on_missing: bool,
    ) -> RootDomainReport {
        let mut report = RootDomainReport::default();
        for statement in statements.iter().filter(|s| s.core_peer.is_some()) {
            let urn = statement.urn();
            let declarable = statement.types.intersection(DECLARABLE_TYPES);
            let message = match declarable.len() {
                0 => Some(format!("cannot establish the core type of {urn}")),
                1 => None,
                _ => Some(format!(
                    "core type of {urn} is ambiguous: {}",
                    declarable.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
                )),
            };
            if let Some(message) = message {
                report.warnings.push(worldview_warning(message, &urn));
                continue;
            }
            let tag = declarable.iter().next();
            if let Some(tag) = tag {
                if let Some(previous) = report.assignments.insert(tag, urn.clone()) {
                    report.warnings.push(worldview_warning(
                        format!("core type {tag} reassigned from {previous} to {urn}"),
                        &urn,
                    ));
                }
            }
        }

        if warn_on_missing {
            let overridden: Vec<SemanticType> = self
                .overrides
                .read()
                .map(|o| o.keys().copied().collect())
                .unwrap_or_default();
            for &tag in DECLARABLE_TYPES {
                if !report.assignments.contains_key(&tag) && !overridden.contains(&tag) {
                    let message = format!("no foundational concept declared for {tag}");
                    warn!("{}", message);
                    report
                        .warnings
                        .push(Diagnostic::warning(DiagnosticKind::Worldview, message));
                }
            }
        }
        report
    }

    /// Restriction property a trait is recorded under
    pub fn base_trait_property(types: &TypeSet) -> &'static str {
        trait_property(types)
    }
}

fn worldview_warning(message: String, urn: &str) -> Diagnostic {
    warn!("{}", message);
    Diagnostic::warning(DiagnosticKind::Worldview, message).for_declaration(urn)
}
