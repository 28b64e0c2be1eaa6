// Copyright 2025 Cowboy AI, LLC.

//! Worldview
//!
//! A [`Worldview`] owns everything shared by the builders created from it:
//! the classification back-end, the declaration source, the core type
//! registry, the namespace intern tables, the emergence registrar and the
//! diagnostic log. It also translates concept statements and parsed
//! declarations into registered concepts.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, RwLock};

use lru::LruCache;
use tracing::{debug, info, warn};

use crate::axioms::{ns, trait_property, Axiom, AxiomBatch, RestrictionKind, TRAIT_PROPERTIES};
use crate::backend::{ClassificationBackend, InMemoryBackend};
use crate::builder::{CompositionRequest, MediationState, ObservableBuilder};
use crate::concept::Concept;
use crate::config::SemanticsConfig;
use crate::core_ontology::{CoreOntology, RootDomainReport};
use crate::declaration::{
    ConceptStatement, Declaration, DeclarationSource, InMemoryDeclarationCatalog,
    ObservableDeclaration, TriggerDeclaration,
};
use crate::diagnostics::{Diagnostic, DiagnosticLog};
use crate::emergence::{EmergenceRegistrar, Observation, ObservationCatalog, Trigger};
use crate::errors::{SemanticError, SemanticResult};
use crate::mediation::Mediation;
use crate::namespace::NamespaceRegistry;
use crate::observable::Observable;
use crate::semantic_role::SemanticRole;

/// Shared semantic state
pub struct Worldview {
    config: SemanticsConfig,
    backend: Arc<dyn ClassificationBackend>,
    declarations: Arc<dyn DeclarationSource>,
    core: CoreOntology,
    namespaces: NamespaceRegistry,
    emergence: RwLock<EmergenceRegistrar>,
    diagnostics: DiagnosticLog,
    concept_cache: Mutex<LruCache<String, Concept>>,
}

impl fmt::Debug for Worldview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worldview")
            .field("config", &self.config)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl Worldview {
    /// Worldview over a back-end and a declaration source
    pub fn new(
        config: SemanticsConfig,
        backend: Arc<dyn ClassificationBackend>,
        declarations: Arc<dyn DeclarationSource>,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.declaration_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            core: CoreOntology::new(config.core_namespace.clone(), backend.clone()),
            config,
            backend,
            declarations,
            namespaces: NamespaceRegistry::new(),
            emergence: RwLock::new(EmergenceRegistrar::new()),
            diagnostics: DiagnosticLog::new(),
            concept_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Worldview over the in-memory back-end and declaration catalog
    pub fn in_memory(config: SemanticsConfig) -> Self {
        let backend = Arc::new(InMemoryBackend::new(config.core_namespace.clone()));
        let declarations = Arc::new(InMemoryDeclarationCatalog::new());
        Self::new(config, backend, declarations)
    }

    /// Configuration
    pub fn config(&self) -> &SemanticsConfig {
        &self.config
    }

    /// Classification back-end
    pub fn backend(&self) -> &dyn ClassificationBackend {
        self.backend.as_ref()
    }

    /// Declaration source
    pub fn declarations(&self) -> &dyn DeclarationSource {
        self.declarations.as_ref()
    }

    /// Core type registry
    pub fn core(&self) -> &CoreOntology {
        &self.core
    }

    /// Namespace intern tables
    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    /// Diagnostic log
    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Diagnostics recorded against a declaration URN
    pub fn diagnostics_for(&self, declaration: &str) -> Vec<Diagnostic> {
        self.diagnostics.for_declaration(declaration)
    }

    /// Registered concept by URN
    pub fn concept(&self, urn: &str) -> SemanticResult<Concept> {
        self.backend
            .get_concept(urn)
            .ok_or_else(|| SemanticError::ConceptNotFound(urn.to_string()))
    }

    /// Declaration a concept was defined or composed from
    pub fn declaration_of(&self, concept: &Concept) -> SemanticResult<Declaration> {
        self.namespaces
            .declaration(concept.urn())
            .or_else(|| self.declarations.retrieve_concept(concept.urn()))
            .ok_or_else(|| SemanticError::DeclarationNotFound(concept.urn().to_string()))
    }

    /// Define every default foundational concept not yet known.
    ///
    /// Returns how many were defined.
    pub fn bootstrap_core(&self) -> SemanticResult<usize> {
        let mut defined = 0;
        for statement in self.core.core_statements() {
            if self.backend.get_concept(&statement.urn()).is_none() {
                self.define_concept(&statement)?;
                defined += 1;
            }
        }
        info!("bootstrapped {} core concepts in {}", defined, self.config.core_namespace);
        Ok(defined)
    }

    /// Register a named concept.
    ///
    /// Without explicit parents the concept is placed under the foundational
    /// concept of its tags. Foundational concepts themselves are roots.
    pub fn define_concept(&self, statement: &ConceptStatement) -> SemanticResult<Concept> {
        if statement.namespace.is_empty() || statement.name.is_empty() {
            return Err(SemanticError::invalid("concept statements need a namespace and a name"));
        }
        let urn = statement.urn();
        let mut batch = AxiomBatch::new();
        batch.push(Axiom::ClassAssertion {
            id: urn.clone(),
            types: statement.types.clone(),
        });
        if let Some(label) = &statement.label {
            batch.annotate(&urn, ns::DISPLAY_LABEL, label.clone());
        }

        if !statement.parents.is_empty() {
            for parent in &statement.parents {
                batch.push(Axiom::SubClass {
                    parent: parent.clone(),
                    child: urn.clone(),
                });
            }
        } else if !self.config.is_core_namespace(&statement.namespace) {
            match self.core.get_core_type(&statement.types)? {
                Some(core) if core.urn() != urn => batch.push(Axiom::SubClass {
                    parent: core.urn().to_string(),
                    child: urn.clone(),
                }),
                Some(_) => {}
                None => debug!("{} has no foundational concept", urn),
            }
        }

        for (role, target) in &statement.restrictions {
            let target = self.concept(target)?;
            let property = role.property().ok_or_else(|| {
                SemanticError::invalid(format!("{role} cannot be declared as a restriction"))
            })?;
            batch.restrict(&urn, property, RestrictionKind::Some, &[&target]);
        }
        for t in &statement.traits {
            let t = self.concept(t)?;
            if !t.types().is_trait() {
                return Err(SemanticError::invalid(format!(
                    "{urn} cannot adopt {} as a trait",
                    t.urn()
                )));
            }
            batch.restrict(&urn, trait_property(t.types()), RestrictionKind::Union, &[&t]);
        }

        self.backend.define(batch)?;
        let concept = self.concept(&urn)?;
        self.namespaces
            .record_declaration(&urn, statement.declaration())?;

        if statement.core_peer.is_some() {
            self.core.set_as_core_type(&concept)?;
        }
        if !statement.emergence.is_empty() {
            let triggers = statement
                .emergence
                .iter()
                .map(|t| self.trigger(t))
                .collect::<SemanticResult<Vec<_>>>()?;
            self.register_emergent(&concept, triggers)?;
        }
        debug!("defined {}", urn);
        Ok(concept)
    }

    /// Define a set of statements, then check their foundational mapping
    pub fn load(&self, statements: &[ConceptStatement]) -> SemanticResult<RootDomainReport> {
        for statement in statements {
            self.define_concept(statement)?;
        }
        let report = self
            .core
            .validate_root_domain(statements, self.config.warn_on_missing_core_types);
        for warning in &report.warnings {
            let key = warning.declaration.as_deref().unwrap_or(&self.config.core_namespace);
            self.diagnostics.record(key, [warning.clone()])?;
        }
        Ok(report)
    }

    fn trigger(&self, declaration: &TriggerDeclaration) -> SemanticResult<Trigger> {
        Ok(match declaration {
            TriggerDeclaration::Urn(urn) => Trigger::Observable(self.concept(urn)?),
            TriggerDeclaration::Union(operands) => Trigger::Union(
                operands
                    .iter()
                    .map(|o| self.trigger(o))
                    .collect::<SemanticResult<_>>()?,
            ),
            TriggerDeclaration::Intersection(operands) => Trigger::Intersection(
                operands
                    .iter()
                    .map(|o| self.trigger(o))
                    .collect::<SemanticResult<_>>()?,
            ),
        })
    }

    /// Builder over a concept
    pub fn builder(&self, concept: Concept) -> ObservableBuilder<'_> {
        ObservableBuilder::new(self, concept)
    }

    /// Builder seeded from an existing observable: its raw main concept,
    /// the modifiers asserted on its concept, and its mediation
    pub fn builder_for_observable(
        &self,
        observable: &Observable,
    ) -> SemanticResult<ObservableBuilder<'_>> {
        let mut request = self.composition_of(observable.concept())?;
        request.collective |= observable.is_collective();
        Ok(ObservableBuilder::from_parts(
            self,
            request,
            MediationState::of(observable),
        ))
    }

    /// Request that rebuilds a composite: its raw main concept plus the
    /// modifiers, traits and roles restricted on it
    pub(crate) fn composition_of(&self, concept: &Concept) -> SemanticResult<CompositionRequest> {
        let main = match concept.core_observable() {
            Some(urn) => self.concept(urn)?,
            None => concept.clone().with_collective(false),
        };
        let mut request = CompositionRequest::new(main);
        if request.main.urn() != concept.urn() {
            for role in SemanticRole::POSITIONAL {
                let Some(property) = role.property() else {
                    continue;
                };
                if let Some(target) = self.backend.direct_restricted(concept, property).into_iter().next() {
                    request.modifiers.insert(role, target);
                }
            }
            for property in TRAIT_PROPERTIES {
                for t in self.backend.direct_restricted(concept, property) {
                    if !request.traits.contains(&t) {
                        request.traits.push(t);
                    }
                }
            }
            request.roles = self.backend.direct_restricted(concept, ns::HAS_ROLE);
        }
        request.collective = concept.is_collective();
        Ok(request)
    }

    /// Concept for a parsed declaration, built recursively and memoized by
    /// declaration URN
    pub fn declare_concept(&self, declaration: &Declaration) -> SemanticResult<Concept> {
        let key = declaration.urn();
        {
            let mut cache = self
                .concept_cache
                .lock()
                .map_err(|_| SemanticError::LockPoisoned("concept cache".to_string()))?;
            if let Some(concept) = cache.get(&key) {
                return Ok(concept.clone());
            }
        }

        let main = self.concept(&declaration.main_urn())?;
        let mut builder = self.builder(main);
        for t in &declaration.traits {
            builder = builder.with_trait(self.declare_concept(t)?);
        }
        for r in &declaration.roles {
            builder = builder.with_role(self.declare_concept(r)?);
        }
        for (role, modifier) in &declaration.modifiers {
            builder = builder.with_modifier(*role, self.declare_concept(modifier)?);
        }
        if declaration.collective {
            builder = builder.collective();
        }
        if let Some(operator) = declaration.operator {
            let comparison = declaration
                .comparison
                .as_deref()
                .map(|c| self.declare_concept(c))
                .transpose()?;
            builder = builder.apply(operator, comparison)?;
        }
        let concept = builder.build_concept()?;

        self.concept_cache
            .lock()
            .map_err(|_| SemanticError::LockPoisoned("concept cache".to_string()))?
            .put(key, concept.clone());
        Ok(concept)
    }

    /// Observable for a parsed observable declaration
    pub fn declare_observable(
        &self,
        declaration: &ObservableDeclaration,
    ) -> SemanticResult<Observable> {
        let concept = self.declare_concept(&declaration.concept)?;
        let mut builder = self.builder(concept);
        builder = match &declaration.mediation {
            Some(Mediation::Unit(unit)) => builder.with_unit(unit.clone()),
            Some(Mediation::Currency(currency)) => builder.with_currency(currency.clone()),
            None => builder,
        };
        if let Some(range) = declaration.range {
            builder = builder.with_range(range);
        }
        for (operator, operand) in &declaration.value_operators {
            builder = builder.with_value_operator(*operator, operand.clone());
        }
        if let Some(value) = &declaration.default_value {
            builder = builder.with_default_value(value.clone());
        }
        for directive in &declaration.resolution_directives {
            builder = builder.with_resolution_directive(*directive);
        }
        if declaration.optional {
            builder = builder.optional();
        }
        if let Some(name) = &declaration.stated_name {
            builder = builder.named(name.clone());
        }
        builder.build_observable()
    }

    /// Register an emergent concept with its triggers
    pub fn register_emergent(&self, concept: &Concept, triggers: Vec<Trigger>) -> SemanticResult<bool> {
        let mut registrar = self
            .emergence
            .write()
            .map_err(|_| SemanticError::LockPoisoned("emergence registrar".to_string()))?;
        let registered = registrar.register_emergent(concept, triggers)?;
        if !registered {
            warn!("{} is abstract and cannot emerge", concept.urn());
        }
        Ok(registered)
    }

    /// Emergent concepts triggered through a concept
    pub fn emergence_matches(
        &self,
        trigger: &Concept,
        catalog: &dyn ObservationCatalog,
    ) -> SemanticResult<Vec<(Concept, Vec<Observation>)>> {
        let registrar = self
            .emergence
            .read()
            .map_err(|_| SemanticError::LockPoisoned("emergence registrar".to_string()))?;
        Ok(registrar.matches(trigger, catalog))
    }

    /// Emergent concepts a new observation makes resolvable
    pub fn emergent_resolvables(
        &self,
        observation: &Observation,
        catalog: &dyn ObservationCatalog,
    ) -> SemanticResult<Vec<(Concept, Vec<Observation>)>> {
        let registrar = self
            .emergence
            .read()
            .map_err(|_| SemanticError::LockPoisoned("emergence registrar".to_string()))?;
        Ok(registrar.emergent_resolvables(observation, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::MockDeclarationSource;
    use crate::semantic_type::SemanticType;

    #[test]
    fn test_bootstrap_is_idempotent() {
        let worldview = Worldview::in_memory(SemanticsConfig::default());
        let defined = worldview.bootstrap_core().unwrap();
        assert!(defined > 40);
        assert_eq!(worldview.bootstrap_core().unwrap(), 0);
        assert!(worldview.concept("odo:Speed").is_ok());
    }

    #[test]
    fn test_define_places_under_core_type() {
        let worldview = Worldview::in_memory(SemanticsConfig::default());
        worldview.bootstrap_core().unwrap();
        let statement = ConceptStatement::from_keyword("geo", "Elevation", "length").unwrap();
        let elevation = worldview.define_concept(&statement).unwrap();
        let length = worldview.concept("odo:Length").unwrap();
        assert!(worldview.backend().subsumes(&length, &elevation));
        assert_eq!(
            worldview.declaration_of(&elevation).unwrap(),
            statement.declaration()
        );
    }

    #[test]
    fn test_define_without_bootstrap_fails_lookup() {
        let worldview = Worldview::in_memory(SemanticsConfig::default());
        let statement = ConceptStatement::from_keyword("geo", "Elevation", "length").unwrap();
        let err = worldview.define_concept(&statement).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let worldview = Worldview::in_memory(SemanticsConfig::default());
        let statement = ConceptStatement::new("geo", "", SemanticType::types_for_keyword("thing").unwrap());
        assert!(matches!(
            worldview.define_concept(&statement),
            Err(SemanticError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_declarations_fall_back_to_source() {
        let backend = Arc::new(InMemoryBackend::default());
        let mut source = MockDeclarationSource::new();
        source
            .expect_retrieve_concept()
            .times(1)
            .returning(|_| Some(Declaration::named("ext", "River", Default::default())));
        let worldview = Worldview::new(SemanticsConfig::default(), backend, Arc::new(source));
        let river = Concept::new("ext", "River", Default::default());
        let declaration = worldview.declaration_of(&river).unwrap();
        assert_eq!(declaration.main_urn(), "ext:River");
    }
}
