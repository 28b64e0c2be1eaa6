// Copyright 2025 Cowboy AI, LLC.

//! # CIM Semantics
//!
//! Semantic composition and classification core for the Composable
//! Information Machine.
//!
//! This crate turns structured concept expressions into canonical, interned
//! concepts registered in a classification back-end:
//! - **Semantic types**: tag sets describing what kind of thing a concept is
//! - **Core ontology**: one foundational concept per representative tag
//! - **Composition builder**: traits, roles, positional modifiers, unary
//!   operators and mediation folded into a single canonical concept or
//!   observable
//! - **Axiom emission**: the batch of assertions defining a new composite
//! - **Emergence**: concepts that appear once their triggers are observed
//!
//! ## Design Principles
//!
//! 1. **Canonical identity**: the same request always yields the same concept,
//!    whatever the order of the builder calls
//! 2. **Interning**: one concept per canonical reference name and namespace
//! 3. **Accumulated diagnostics**: classification problems are collected,
//!    never panicked on
//! 4. **Injected state**: builders borrow the [`Worldview`] that owns all
//!    shared registries

#![warn(missing_docs)]

mod axioms;
mod backend;
mod concept;
mod config;
mod core_ontology;
mod declaration;
mod diagnostics;
mod emergence;
mod errors;
mod mediation;
mod namespace;
mod observable;
mod operators;
mod semantic_role;
mod semantic_type;
mod worldview;
pub mod builder;

// Re-export core types
pub use axioms::{
    emit_composite, emit_operator_result, ns, trait_property, Axiom, AxiomBatch,
    CompositeDefinition, RestrictionKind, TRAIT_PROPERTIES,
};
pub use backend::{ClassificationBackend, InMemoryBackend, NOTHING_URN};
pub use builder::{CompositionRequest, ObservableBuilder, Removal};
pub use concept::{default_reference_name, snake_case, split_urn, Concept};
pub use config::SemanticsConfig;
pub use core_ontology::{core_types, default_core_name, CoreOntology, RootDomainReport, CORE_TAGS};
pub use declaration::{
    ConceptStatement, Declaration, DeclarationSource, InMemoryDeclarationCatalog,
    ObservableDeclaration, TriggerDeclaration,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog, Severity};
pub use emergence::{
    Emergence, EmergenceRegistrar, InMemoryObservationCatalog, Observation, ObservationCatalog,
    ObservationId, Trigger,
};
pub use errors::{SemanticError, SemanticResult};
pub use mediation::{Currency, CurrencyType, Mediation, NumericRange, Unit};
pub use namespace::{NamespaceRegistry, NamespaceTable};
pub use observable::{Literal, Observable, ResolutionDirective, ValueOperand};
pub use operators::{UnarySemanticOperator, ValueOperator};
pub use semantic_role::SemanticRole;
pub use semantic_type::{
    fundamental_type, representative_core_type, SemanticType, TypeSet, ALL_QUALITY_TYPES,
    ALL_TRAIT_TYPES, BASE_MODELABLE_TYPES, BASE_OBSERVABLE_TYPES, CONTINUOUS_QUALITY_TYPES,
    CORE_TYPE_PRECEDENCE, DECLARABLE_TYPES, DIRECT_OBSERVABLE_TYPES, FUNDAMENTAL_TYPES,
    INHERENT_QUALITIES, MODELABLE_TYPES, OPERATOR_TYPES, QUALITY_TYPES, TRAIT_TYPES,
};
pub use worldview::Worldview;
