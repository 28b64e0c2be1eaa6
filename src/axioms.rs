// Copyright 2025 Cowboy AI, LLC.

//! Axiom emission
//!
//! Everything the classification back-end learns about a concept arrives as
//! one [`AxiomBatch`]. The emitter functions below translate a validated
//! composition (or a named concept statement, or a unary operator result)
//! into that batch in a fixed order: class assertion, annotations,
//! sub-class assertions, restrictions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::concept::Concept;
use crate::semantic_role::SemanticRole;
use crate::semantic_type::{SemanticType, TypeSet};

/// Property and annotation vocabulary
pub mod ns {
    /// Attribute trait restriction
    pub const HAS_ATTRIBUTE: &str = "odo:hasAttribute";
    /// Realm trait restriction
    pub const HAS_REALM: &str = "odo:hasRealm";
    /// Identity trait restriction
    pub const HAS_IDENTITY: &str = "odo:hasIdentity";
    /// Generic trait restriction
    pub const HAS_TRAIT: &str = "odo:hasTrait";
    /// Subjective trait restriction
    pub const HAS_SUBJECTIVE_TRAIT: &str = "odo:hasSubjectiveTrait";
    /// Role restriction
    pub const HAS_ROLE: &str = "odo:hasRole";
    /// Inherency
    pub const IS_INHERENT_TO: &str = "odo:isInherentTo";
    /// Compresence
    pub const HAS_COMPRESENT: &str = "odo:hasCompresent";
    /// Causant
    pub const HAS_CAUSANT: &str = "odo:hasCausant";
    /// Caused
    pub const HAS_CAUSED: &str = "odo:hasCaused";
    /// Goal
    pub const HAS_PURPOSE: &str = "odo:hasPurpose";
    /// Co-occurrence
    pub const OBSERVED_DURING: &str = "odo:observedDuring";
    /// Adjacency
    pub const IS_ADJACENT_TO: &str = "odo:isAdjacentTo";
    /// Relationship source
    pub const IMPLIES_SOURCE: &str = "odo:impliesSource";
    /// Relationship target
    pub const IMPLIES_DESTINATION: &str = "odo:impliesDestination";
    /// Temporal inherency
    pub const HAS_TEMPORAL_INHERENT: &str = "odo:hasTemporalInherent";
    /// Argument of a unary operator
    pub const DESCRIBES_OBSERVABLE: &str = "klab:describesObservable";
    /// Comparison operand of a unary operator
    pub const IS_COMPARED_TO: &str = "klab:isComparedTo";

    /// Abstract flag
    pub const IS_ABSTRACT: &str = "odo:isAbstract";
    /// Marks a concept defined by a named statement
    pub const BASE_DECLARATION: &str = "klab:baseDeclaration";
    /// Main concept of a composite
    pub const CORE_OBSERVABLE: &str = "klab:coreObservable";
    /// Declaration URN a concept was built from
    pub const CONCEPT_DEFINITION: &str = "klab:conceptDefinition";
    /// Label for humans
    pub const DISPLAY_LABEL: &str = "klab:displayLabel";
    /// Identifier-safe reference name
    pub const REFERENCE_NAME: &str = "klab:referenceName";
    /// Argument concept of a unary operator result
    pub const UNTRANSFORMED_CONCEPT: &str = "klab:untransformedConcept";
    /// Canonical display id
    pub const RDFS_LABEL: &str = "rdfs:label";
}

/// How the targets of a restriction combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionKind {
    /// Values range over the union of the targets
    Union,
    /// Some value belongs to the targets
    Some,
}

/// A single assertion for the classification back-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axiom {
    /// Declare a class with its tags
    ClassAssertion {
        /// Concept URN
        id: String,
        /// Semantic tags
        types: TypeSet,
    },
    /// Annotate a class
    Annotation {
        /// Concept URN
        id: String,
        /// Annotation property
        property: String,
        /// Value
        value: String,
    },
    /// `child` is a `parent`
    SubClass {
        /// Parent URN
        parent: String,
        /// Child URN
        child: String,
    },
    /// Constrain the values of a property for a class
    Restriction {
        /// Restricted concept URN
        id: String,
        /// Object property
        property: String,
        /// Quantifier
        kind: RestrictionKind,
        /// Target URNs
        targets: Vec<String>,
    },
    /// The two classes share no instances
    Disjoint {
        /// First URN
        first: String,
        /// Second URN
        second: String,
    },
}

impl Axiom {
    /// URN of the concept this axiom is about
    pub fn subject(&self) -> &str {
        match self {
            Axiom::ClassAssertion { id, .. }
            | Axiom::Annotation { id, .. }
            | Axiom::Restriction { id, .. } => id,
            Axiom::SubClass { child, .. } => child,
            Axiom::Disjoint { first, .. } => first,
        }
    }
}

/// Axioms submitted together; back-ends apply all or none
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxiomBatch {
    axioms: Vec<Axiom>,
}

impl AxiomBatch {
    /// Empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axiom
    pub fn push(&mut self, axiom: Axiom) {
        self.axioms.push(axiom);
    }

    /// Append an annotation
    pub fn annotate(&mut self, id: &str, property: &str, value: impl Into<String>) {
        self.push(Axiom::Annotation {
            id: id.to_string(),
            property: property.to_string(),
            value: value.into(),
        });
    }

    /// Append a restriction, skipping empty target lists
    pub fn restrict(&mut self, id: &str, property: &str, kind: RestrictionKind, targets: &[&Concept]) {
        if targets.is_empty() {
            return;
        }
        self.push(Axiom::Restriction {
            id: id.to_string(),
            property: property.to_string(),
            kind,
            targets: targets.iter().map(|c| c.urn().to_string()).collect(),
        });
    }

    /// Axioms in submission order
    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    /// Number of axioms
    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }
}

impl IntoIterator for AxiomBatch {
    type Item = Axiom;
    type IntoIter = std::vec::IntoIter<Axiom>;

    fn into_iter(self) -> Self::IntoIter {
        self.axioms.into_iter()
    }
}

/// Validated composite, ready to be asserted
#[derive(Debug, Clone)]
pub struct CompositeDefinition<'a> {
    /// URN minted for the composite
    pub id: &'a str,
    /// Tags after abstract re-evaluation
    pub types: &'a TypeSet,
    /// Canonical display id
    pub display_id: &'a str,
    /// Display label
    pub display_label: &'a str,
    /// Canonical reference name
    pub reference_name: &'a str,
    /// Declaration URN the composite was built from
    pub definition: &'a str,
    /// Main concept, already operator-transformed
    pub main: &'a Concept,
    /// Surviving traits
    pub traits: &'a [Concept],
    /// Surviving roles
    pub roles: &'a [Concept],
    /// Surviving positional modifiers
    pub modifiers: &'a BTreeMap<SemanticRole, Concept>,
}

/// Restriction property for a trait, by family
pub fn trait_property(types: &TypeSet) -> &'static str {
    if types.contains(SemanticType::Identity) {
        ns::HAS_IDENTITY
    } else if types.contains(SemanticType::Realm) {
        ns::HAS_REALM
    } else if types.contains(SemanticType::Subjective) {
        ns::HAS_SUBJECTIVE_TRAIT
    } else if types.contains(SemanticType::Attribute) {
        ns::HAS_ATTRIBUTE
    } else {
        ns::HAS_TRAIT
    }
}

/// Every property under which traits are recorded
pub const TRAIT_PROPERTIES: [&str; 5] = [
    ns::HAS_IDENTITY,
    ns::HAS_REALM,
    ns::HAS_ATTRIBUTE,
    ns::HAS_SUBJECTIVE_TRAIT,
    ns::HAS_TRAIT,
];

/// Axioms for a new composite concept
pub fn emit_composite(def: &CompositeDefinition<'_>) -> AxiomBatch {
    let id = def.id;
    let mut batch = AxiomBatch::new();

    batch.push(Axiom::ClassAssertion {
        id: id.to_string(),
        types: def.types.clone(),
    });
    batch.annotate(id, ns::DISPLAY_LABEL, def.display_label);
    batch.annotate(id, ns::RDFS_LABEL, def.display_id);
    batch.annotate(id, ns::REFERENCE_NAME, def.reference_name);
    batch.annotate(id, ns::CORE_OBSERVABLE, def.main.urn());
    batch.annotate(id, ns::CONCEPT_DEFINITION, def.definition);
    if def.types.is_abstract() {
        batch.annotate(id, ns::IS_ABSTRACT, "true");
    }

    batch.push(Axiom::SubClass {
        parent: def.main.urn().to_string(),
        child: id.to_string(),
    });

    let mut by_family: BTreeMap<&'static str, Vec<&Concept>> = BTreeMap::new();
    for t in def.traits {
        by_family.entry(trait_property(t.types())).or_default().push(t);
    }
    for property in TRAIT_PROPERTIES {
        if let Some(traits) = by_family.get(property) {
            batch.restrict(id, property, RestrictionKind::Union, traits);
        }
    }

    let roles: Vec<&Concept> = def.roles.iter().collect();
    batch.restrict(id, ns::HAS_ROLE, RestrictionKind::Some, &roles);

    for (role, target) in def.modifiers {
        if let Some(property) = role.property() {
            batch.restrict(id, property, RestrictionKind::Some, &[target]);
        }
    }

    batch
}

/// Axioms for the result of a unary semantic operator
pub fn emit_operator_result(
    id: &str,
    types: &TypeSet,
    display_id: &str,
    reference_name: &str,
    parent: &Concept,
    argument: &Concept,
    comparison: Option<&Concept>,
) -> AxiomBatch {
    let mut batch = AxiomBatch::new();
    batch.push(Axiom::ClassAssertion {
        id: id.to_string(),
        types: types.clone(),
    });
    batch.annotate(id, ns::DISPLAY_LABEL, display_id);
    batch.annotate(id, ns::RDFS_LABEL, display_id);
    batch.annotate(id, ns::REFERENCE_NAME, reference_name);
    batch.annotate(id, ns::UNTRANSFORMED_CONCEPT, argument.urn());
    batch.push(Axiom::SubClass {
        parent: parent.urn().to_string(),
        child: id.to_string(),
    });
    batch.restrict(id, ns::DESCRIBES_OBSERVABLE, RestrictionKind::Some, &[argument]);
    if let Some(comparison) = comparison {
        batch.restrict(id, ns::IS_COMPARED_TO, RestrictionKind::Some, &[comparison]);
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn concept(name: &str, keyword: &str) -> Concept {
        Concept::new("geo", name, SemanticType::types_for_keyword(keyword).unwrap())
    }

    #[test]
    fn test_composite_axiom_order() {
        let main = concept("Biomass", "quantity");
        let forest = concept("Forest", "thing");
        let tropical = concept("Tropical", "realm");
        let mut modifiers = BTreeMap::new();
        modifiers.insert(SemanticRole::Inherent, forest.clone());
        let types = main.types().clone();
        let traits = vec![tropical.clone()];

        let batch = emit_composite(&CompositeDefinition {
            id: "geo:TropicalBiomassOfForest",
            types: &types,
            display_id: "TropicalBiomassOfForest",
            display_label: "TropicalBiomassOfForest",
            reference_name: "geo_tropical_geo_biomass_of_geo_forest",
            definition: "geo:Tropical geo:Biomass of geo:Forest",
            main: &main,
            traits: &traits,
            roles: &[],
            modifiers: &modifiers,
        });

        let axioms = batch.axioms();
        assert!(matches!(axioms[0], Axiom::ClassAssertion { .. }));
        let first_subclass = axioms
            .iter()
            .position(|a| matches!(a, Axiom::SubClass { .. }))
            .unwrap();
        let first_restriction = axioms
            .iter()
            .position(|a| matches!(a, Axiom::Restriction { .. }))
            .unwrap();
        assert!(first_subclass < first_restriction);
        assert_eq!(
            axioms[first_restriction],
            Axiom::Restriction {
                id: "geo:TropicalBiomassOfForest".into(),
                property: ns::HAS_REALM.into(),
                kind: RestrictionKind::Union,
                targets: vec!["geo:Tropical".into()],
            }
        );
        assert_eq!(
            axioms.last().unwrap(),
            &Axiom::Restriction {
                id: "geo:TropicalBiomassOfForest".into(),
                property: ns::IS_INHERENT_TO.into(),
                kind: RestrictionKind::Some,
                targets: vec!["geo:Forest".into()],
            }
        );
        assert!(!axioms
            .iter()
            .any(|a| matches!(a, Axiom::Annotation { property, .. } if property == ns::IS_ABSTRACT)));
    }

    #[test]
    fn test_trait_property_by_family() {
        assert_eq!(trait_property(&TypeSet::of(&[SemanticType::Identity])), ns::HAS_IDENTITY);
        assert_eq!(
            trait_property(&TypeSet::of(&[SemanticType::Attribute, SemanticType::Subjective])),
            ns::HAS_SUBJECTIVE_TRAIT
        );
        assert_eq!(trait_property(&TypeSet::of(&[SemanticType::Trait])), ns::HAS_TRAIT);
    }

    #[test]
    fn test_empty_restrictions_are_skipped() {
        let mut batch = AxiomBatch::new();
        batch.restrict("geo:X", ns::HAS_ROLE, RestrictionKind::Some, &[]);
        assert!(batch.is_empty());
    }
}
