// Copyright 2025 Cowboy AI, LLC.

//! Composition builder
//!
//! [`ObservableBuilder`] accumulates a composition request against a base
//! concept (traits, roles, positional modifiers, a unary operator and
//! mediation) and turns it into a registered concept or an [`Observable`].
//!
//! ```mermaid
//! graph LR
//!     A[accumulate] --> B[validate]
//!     B --> C[canonicalize]
//!     C --> D{interned?}
//!     D -->|yes| E[existing concept]
//!     D -->|no| F[emit axioms]
//!     F --> E
//! ```
//!
//! Request methods take the builder by value and return it, so calls chain.
//! Detaching methods borrow the builder and return a new one that remembers
//! what was removed.

mod canonical;
mod finalize;

use std::collections::BTreeMap;

use tracing::{debug, warn};

pub use canonical::{canonicalize, target_namespace, CanonicalName};
pub use finalize::finalize;

use crate::axioms::ns;
use crate::concept::Concept;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::errors::{SemanticError, SemanticResult};
use crate::mediation::{Currency, Mediation, NumericRange, Unit};
use crate::observable::{Literal, Observable, ResolutionDirective, ValueOperand};
use crate::operators::{UnarySemanticOperator, ValueOperator};
use crate::semantic_role::SemanticRole;
use crate::semantic_type::SemanticType;
use crate::worldview::Worldview;

/// A concept detached from a builder, and the slot it occupied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Detached concept
    pub concept: Concept,
    /// Slot it was attached in
    pub role: SemanticRole,
}

/// Pending composition over a main concept
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionRequest {
    pub(crate) main: Concept,
    pub(crate) modifiers: BTreeMap<SemanticRole, Concept>,
    pub(crate) traits: Vec<Concept>,
    pub(crate) roles: Vec<Concept>,
    pub(crate) operator: Option<UnarySemanticOperator>,
    pub(crate) comparison: Option<Concept>,
    pub(crate) collective: bool,
}

impl CompositionRequest {
    /// Empty request over a main concept
    pub fn new(main: Concept) -> Self {
        Self {
            collective: main.is_collective(),
            main,
            modifiers: BTreeMap::new(),
            traits: Vec::new(),
            roles: Vec::new(),
            operator: None,
            comparison: None,
        }
    }

    /// Main concept; the operator result once an operator was applied
    pub fn main(&self) -> &Concept {
        &self.main
    }

    /// Positional modifiers in canonical order
    pub fn modifiers(&self) -> &BTreeMap<SemanticRole, Concept> {
        &self.modifiers
    }

    /// Attached traits
    pub fn traits(&self) -> &[Concept] {
        &self.traits
    }

    /// Attached roles
    pub fn roles(&self) -> &[Concept] {
        &self.roles
    }

    /// Applied unary operator
    pub fn operator(&self) -> Option<UnarySemanticOperator> {
        self.operator
    }

    /// Comparison operand of the applied operator
    pub fn comparison(&self) -> Option<&Concept> {
        self.comparison.as_ref()
    }

    /// Whether building would return the main concept unchanged
    pub fn is_trivial(&self) -> bool {
        self.modifiers.is_empty()
            && self.traits.is_empty()
            && self.roles.is_empty()
            && self.operator.is_none()
            && !self.collective
    }

    fn take_attachments(&mut self) -> Vec<Removal> {
        let mut removed: Vec<Removal> = std::mem::take(&mut self.modifiers)
            .into_iter()
            .map(|(role, concept)| Removal { concept, role })
            .collect();
        removed.extend(std::mem::take(&mut self.traits).into_iter().map(|concept| Removal {
            concept,
            role: SemanticRole::Trait,
        }));
        removed.extend(std::mem::take(&mut self.roles).into_iter().map(|concept| Removal {
            concept,
            role: SemanticRole::Role,
        }));
        removed
    }
}

/// Mediation accumulated alongside the composition request
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MediationState {
    pub(crate) mediation: Option<Mediation>,
    pub(crate) range: Option<NumericRange>,
    pub(crate) value_operators: Vec<(ValueOperator, ValueOperand)>,
    pub(crate) default_value: Option<Literal>,
    pub(crate) resolution_directives: std::collections::BTreeSet<ResolutionDirective>,
    pub(crate) optional: bool,
    pub(crate) stated_name: Option<String>,
    pub(crate) reference_name: Option<String>,
}

impl MediationState {
    pub(crate) fn of(observable: &Observable) -> Self {
        Self {
            mediation: observable.mediation.clone(),
            range: observable.range,
            value_operators: observable.value_operators.clone(),
            default_value: observable.default_value.clone(),
            resolution_directives: observable.resolution_directives.clone(),
            optional: observable.optional,
            stated_name: observable.stated_name.clone(),
            reference_name: None,
        }
    }
}

/// Accumulates a composition request and builds it
#[derive(Debug, Clone)]
pub struct ObservableBuilder<'w> {
    worldview: &'w Worldview,
    request: CompositionRequest,
    mediation: MediationState,
    diagnostics: Vec<Diagnostic>,
    removed: Vec<Removal>,
}

impl<'w> ObservableBuilder<'w> {
    /// Builder over a base concept
    pub fn new(worldview: &'w Worldview, concept: Concept) -> Self {
        // A collective seed restarts from its raw main so the prefix is added once
        let request = if concept.is_collective() {
            worldview
                .composition_of(&concept)
                .unwrap_or_else(|_| CompositionRequest::new(concept))
        } else {
            CompositionRequest::new(concept)
        };
        Self::from_parts(worldview, request, MediationState::default())
    }

    pub(crate) fn from_parts(
        worldview: &'w Worldview,
        request: CompositionRequest,
        mediation: MediationState,
    ) -> Self {
        Self {
            worldview,
            request,
            mediation,
            diagnostics: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Worldview the builder registers into
    pub fn worldview(&self) -> &'w Worldview {
        self.worldview
    }

    /// Pending request
    pub fn request(&self) -> &CompositionRequest {
        &self.request
    }

    /// Diagnostics accumulated so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Concepts detached by `without*` calls, oldest first
    pub fn removed(&self) -> &[Removal] {
        &self.removed
    }

    fn reject(mut self, message: String) -> Self {
        warn!("{}", message);
        self.diagnostics
            .push(Diagnostic::error(DiagnosticKind::Classification, message));
        self
    }

    // Positional modifiers

    /// `of`: the observable is inherent to `concept`
    pub fn of(self, concept: Concept) -> Self {
        self.with_modifier(SemanticRole::Inherent, concept)
    }

    /// `with`
    pub fn with(self, concept: Concept) -> Self {
        self.with_modifier(SemanticRole::Compresent, concept)
    }

    /// `for`
    pub fn with_goal(self, concept: Concept) -> Self {
        self.with_modifier(SemanticRole::Goal, concept)
    }

    /// `causing`
    pub fn causing(self, concept: Concept) -> Self {
        self.with_modifier(SemanticRole::Caused, concept)
    }

    /// `caused by`
    pub fn caused_by(self, concept: Concept) -> Self {
        self.with_modifier(SemanticRole::Causant, concept)
    }

    /// `adjacent to`
    pub fn adjacent_to(self, concept: Concept) -> Self {
        self.with_modifier(SemanticRole::Adjacent, concept)
    }

    /// `during`
    pub fn during(self, concept: Concept) -> Self {
        self.with_modifier(SemanticRole::Cooccurrent, concept)
    }

    /// Source and target of a relationship
    pub fn linking(self, source: Concept, target: Concept) -> Self {
        self.with_modifier(SemanticRole::RelationshipSource, source)
            .with_modifier(SemanticRole::RelationshipTarget, target)
    }

    /// `during each`
    pub fn with_temporal_inherent(self, concept: Concept) -> Self {
        self.with_modifier(SemanticRole::TemporalInherent, concept)
    }

    /// Set a positional modifier, replacing any previous one in that slot
    pub fn with_modifier(mut self, role: SemanticRole, concept: Concept) -> Self {
        if !role.is_positional() {
            return self.reject(format!("{role} is not a positional modifier"));
        }
        self.request.modifiers.insert(role, concept);
        self
    }

    // Traits and roles

    /// Attach a trait
    pub fn with_trait(mut self, concept: Concept) -> Self {
        if !concept.types().is_trait() {
            return self.reject(format!("{} is not a trait", concept.urn()));
        }
        if !self.request.traits.contains(&concept) {
            self.request.traits.push(concept);
        }
        self
    }

    /// Attach several traits
    pub fn with_traits(self, concepts: impl IntoIterator<Item = Concept>) -> Self {
        concepts.into_iter().fold(self, Self::with_trait)
    }

    /// Attach a role
    pub fn with_role(mut self, concept: Concept) -> Self {
        if !concept.types().is_role() {
            return self.reject(format!("{} is not a role", concept.urn()));
        }
        let adopted = self
            .worldview
            .backend()
            .restricted(&self.request.main, ns::HAS_ROLE);
        if adopted.contains(&concept) {
            let message = format!(
                "{} already has role {}",
                self.request.main.urn(),
                concept.urn()
            );
            return self.reject(message);
        }
        if !self.request.roles.contains(&concept) {
            self.request.roles.push(concept);
        }
        self
    }

    /// Attach several roles
    pub fn with_roles(self, concepts: impl IntoIterator<Item = Concept>) -> Self {
        concepts.into_iter().fold(self, Self::with_role)
    }

    /// `each`
    pub fn collective(mut self) -> Self {
        self.request.collective = true;
        self
    }

    /// Apply a unary semantic operator to everything accumulated so far.
    ///
    /// The current request is built and replaced by the operator result;
    /// traits, roles, positional modifiers and unit/currency are cleared.
    /// An operand the operator does not accept leaves the builder unchanged
    /// apart from an error diagnostic.
    pub fn apply(
        mut self,
        operator: UnarySemanticOperator,
        comparison: Option<Concept>,
    ) -> SemanticResult<Self> {
        if comparison.is_some() && !operator.takes_comparison() {
            return Err(SemanticError::invalid(format!(
                "'{operator}' does not take a comparison concept"
            )));
        }
        if !operator.accepts(self.request.main.types()) {
            let message = format!("'{operator}' cannot be applied to {}", self.request.main.urn());
            return Ok(self.reject(message));
        }

        let argument = finalize::resolve(self.worldview, &self.request, &self.diagnostics)?;
        let transformed = finalize::apply_operator(
            self.worldview,
            operator,
            &argument.concept,
            comparison.as_ref(),
        )?;
        debug!("{} applied to {}: {}", operator, argument.concept.urn(), transformed.urn());

        self.diagnostics = argument.diagnostics;
        let cleared = self.request.take_attachments();
        self.removed.extend(cleared);
        self.request.main = transformed;
        self.request.operator = Some(operator);
        self.request.comparison = comparison;
        self.request.collective = false;
        self.mediation.mediation = None;
        Ok(self)
    }

    // Mediation

    /// Measurement unit; replaces any currency
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.mediation.mediation = Some(Mediation::Unit(unit));
        self
    }

    /// Currency; replaces any unit
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.mediation.mediation = Some(Mediation::Currency(currency));
        self
    }

    /// Numeric range
    pub fn with_range(mut self, range: NumericRange) -> Self {
        self.mediation.range = Some(range);
        self
    }

    /// Append a value operator
    pub fn with_value_operator(mut self, operator: ValueOperator, operand: ValueOperand) -> Self {
        self.mediation.value_operators.push((operator, operand));
        self
    }

    /// Inline value
    pub fn with_default_value(mut self, value: Literal) -> Self {
        self.mediation.default_value = Some(value);
        self
    }

    /// Add a resolution directive
    pub fn with_resolution_directive(mut self, directive: ResolutionDirective) -> Self {
        self.mediation.resolution_directives.insert(directive);
        self
    }

    /// `optional`
    pub fn optional(mut self) -> Self {
        self.mediation.optional = true;
        self
    }

    /// Name given by the modeller
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.mediation.stated_name = Some(name.into());
        self
    }

    /// Reference name overriding the computed one
    pub fn with_reference_name(mut self, reference_name: impl Into<String>) -> Self {
        self.mediation.reference_name = Some(reference_name.into());
        self
    }

    // Detaching

    fn detach<F>(&self, matches: F) -> Self
    where
        F: Fn(&Concept, SemanticRole) -> bool,
    {
        let mut next = self.clone();
        let request = &mut next.request;
        let mut removed = Vec::new();

        let mut kept = BTreeMap::new();
        for (role, concept) in std::mem::take(&mut request.modifiers) {
            if matches(&concept, role) {
                removed.push(Removal { concept, role });
            } else {
                kept.insert(role, concept);
            }
        }
        request.modifiers = kept;

        for (list, role) in [
            (&mut request.traits, SemanticRole::Trait),
            (&mut request.roles, SemanticRole::Role),
        ] {
            let (gone, stay): (Vec<Concept>, Vec<Concept>) =
                std::mem::take(list).into_iter().partition(|c| matches(c, role));
            *list = stay;
            removed.extend(gone.into_iter().map(|concept| Removal { concept, role }));
        }

        if let Some(comparison) = request.comparison.take() {
            if matches(&comparison, SemanticRole::Comparison) {
                removed.push(Removal {
                    concept: comparison,
                    role: SemanticRole::Comparison,
                });
            } else {
                request.comparison = Some(comparison);
            }
        }

        next.mediation.value_operators.retain(|(_, operand)| match operand {
            ValueOperand::Concept(c) if matches(c, SemanticRole::ValueOperator) => {
                removed.push(Removal {
                    concept: c.clone(),
                    role: SemanticRole::ValueOperator,
                });
                false
            }
            _ => true,
        });

        next.removed.extend(removed);
        next
    }

    /// New builder without the given concepts, wherever attached
    pub fn without(&self, concepts: &[Concept]) -> Self {
        self.detach(|concept, _| concepts.contains(concept))
    }

    /// New builder with the given slots emptied
    pub fn without_roles(&self, roles: &[SemanticRole]) -> Self {
        let mut next = self.detach(|_, role| roles.contains(&role));
        let mediation = &mut next.mediation;
        let cleared = match mediation.mediation {
            Some(Mediation::Unit(_)) => roles.contains(&SemanticRole::Unit),
            Some(Mediation::Currency(_)) => roles.contains(&SemanticRole::Currency),
            None => false,
        };
        if cleared {
            mediation.mediation = None;
        }
        if roles.contains(&SemanticRole::ValueOperator) {
            mediation.value_operators.clear();
        }
        next
    }

    /// New builder without any attached concept carrying one of the tags
    pub fn without_any(&self, types: &[SemanticType]) -> Self {
        self.detach(|concept, _| concept.types().intersects(types))
    }

    /// New builder without any attached concept subsumed by one of the given ones
    pub fn without_any_concepts(&self, concepts: &[Concept]) -> Self {
        let backend = self.worldview.backend();
        self.detach(|concept, _| concepts.iter().any(|general| backend.subsumes(general, concept)))
    }

    // Terminal operations

    /// Register the composite concept, or return the base concept when
    /// nothing was requested
    pub fn build_concept(&self) -> SemanticResult<Concept> {
        finalize(self.worldview, &self.request, self.diagnostics.clone())
    }

    /// Build the concept, then wrap it with the accumulated mediation
    pub fn build_observable(&self) -> SemanticResult<Observable> {
        let concept = self.build_concept()?;
        let types = concept.types().clone();
        let mut diagnostics = Vec::new();
        let mut observable = Observable::promote(concept.clone());
        let mut urn = concept.urn().to_string();

        match &self.mediation.mediation {
            Some(Mediation::Currency(currency)) if types.admits_currency() => {
                urn.push_str(&format!(" in {currency}"));
                observable.mediation = Some(Mediation::Currency(currency.clone()));
            }
            Some(Mediation::Unit(unit)) if types.admits_units() => {
                urn.push_str(&format!(" in {unit}"));
                observable.mediation = Some(Mediation::Unit(unit.clone()));
            }
            Some(mediation) => diagnostics.push(Diagnostic::error(
                DiagnosticKind::Classification,
                format!("{} cannot be expressed in {mediation}", concept.urn()),
            )),
            None => {}
        }

        let mut reference_parts = Vec::new();
        let mut name_parts = Vec::new();
        for (operator, operand) in &self.mediation.value_operators {
            let folded = self.fold_operand(operand)?;
            urn.push_str(&format!(" {} {}", operator.declaration(), folded.text));
            reference_parts.push(format!("{}_{}", operator.text_form(), folded.code));
            name_parts.push(format!("{}_{}", operator.text_form(), folded.name));
            observable.value_operators.push((*operator, folded.resolved));
        }
        if !reference_parts.is_empty() {
            observable.reference_name =
                format!("{}_{}", observable.reference_name, reference_parts.join("_"));
            observable.name = format!("{}_{}", observable.name, name_parts.join("_"));
        }

        if let Some(range) = self.mediation.range {
            if types.is_numeric() {
                urn.push_str(&format!(" {range}"));
                observable.range = Some(range);
            } else {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::Classification,
                    format!("range {range} requires a numeric concept, not {}", concept.urn()),
                ));
            }
        }

        if self.mediation.optional {
            urn.push_str(" optional");
            observable.optional = true;
        }

        observable.default_value = self.mediation.default_value.clone();
        observable.resolution_directives = self.mediation.resolution_directives.clone();
        observable.collective = self.request.collective || concept.is_collective();
        observable.stated_name = self.mediation.stated_name.clone();
        observable.urn = urn;
        if let Some(reference_name) = &self.mediation.reference_name {
            observable.reference_name = reference_name.clone();
        }

        if !diagnostics.is_empty() {
            let declaration = concept.definition().unwrap_or(concept.urn()).to_string();
            let diagnostics: Vec<Diagnostic> = diagnostics
                .into_iter()
                .map(|d| d.for_declaration(declaration.clone()))
                .collect();
            for d in &diagnostics {
                warn!("{}", d);
            }
            self.worldview
                .diagnostics()
                .record(&declaration, diagnostics.clone())?;
            return Err(SemanticError::ValidationFailed {
                diagnostics,
                partial: Some(Box::new(concept)),
            });
        }
        Ok(observable)
    }

    fn fold_operand(&self, operand: &ValueOperand) -> SemanticResult<FoldedOperand> {
        match operand {
            ValueOperand::Concept(concept) => Ok(FoldedOperand {
                text: concept.urn().to_string(),
                code: concept.reference_name().to_string(),
                name: concept.code_name(),
                resolved: operand.clone(),
            }),
            ValueOperand::Observable(observable) => Ok(FoldedOperand {
                text: format!("({})", observable.urn()),
                code: observable.reference_name().to_string(),
                name: observable.name().to_string(),
                resolved: operand.clone(),
            }),
            ValueOperand::Literal(literal) => Ok(FoldedOperand {
                text: literal.to_string(),
                code: literal.code_form(),
                name: literal.code_form(),
                resolved: operand.clone(),
            }),
            ValueOperand::Declaration(declaration) if declaration.is_bare() => {
                let concept = self.worldview.declare_concept(&declaration.concept)?;
                self.fold_operand(&ValueOperand::Concept(concept))
            }
            ValueOperand::Declaration(declaration) => {
                let observable = self.worldview.declare_observable(declaration)?;
                self.fold_operand(&ValueOperand::Observable(Box::new(observable)))
            }
        }
    }
}

struct FoldedOperand {
    text: String,
    code: String,
    name: String,
    resolved: ValueOperand,
}
