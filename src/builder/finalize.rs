// Copyright 2025 Cowboy AI, LLC.

//! Validation and registration of composition requests

use std::collections::BTreeMap;

use tracing::{error, info, warn};

use super::canonical::{canonicalize, target_namespace};
use super::CompositionRequest;
use crate::axioms::{emit_composite, emit_operator_result, CompositeDefinition, TRAIT_PROPERTIES};
use crate::backend::ClassificationBackend;
use crate::concept::Concept;
use crate::declaration::Declaration;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::errors::{SemanticError, SemanticResult};
use crate::operators::UnarySemanticOperator;
use crate::semantic_role::SemanticRole;
use crate::semantic_type::{SemanticType, TypeSet};
use crate::worldview::Worldview;

/// Outcome of resolving a request, before errors are surfaced
pub(crate) struct Resolution {
    pub(crate) concept: Concept,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) definition: String,
}

/// Validate, canonicalize and register a request.
///
/// Classification errors among `diagnostics`, or found while validating,
/// turn into [`SemanticError::ValidationFailed`] carrying the concept that
/// was registered without the offending parts.
pub fn finalize(
    worldview: &Worldview,
    request: &CompositionRequest,
    diagnostics: Vec<Diagnostic>,
) -> SemanticResult<Concept> {
    let Resolution {
        concept,
        diagnostics,
        definition,
    } = resolve(worldview, request, &diagnostics)?;

    if diagnostics.is_empty() {
        return Ok(concept);
    }
    let diagnostics: Vec<Diagnostic> = diagnostics
        .into_iter()
        .map(|d| match d.declaration {
            Some(_) => d,
            None => d.for_declaration(definition.clone()),
        })
        .collect();
    worldview.diagnostics().record(&definition, diagnostics.clone())?;

    let failed = diagnostics
        .iter()
        .any(|d| d.is_error() && d.kind == DiagnosticKind::Classification);
    if failed {
        return Err(SemanticError::ValidationFailed {
            diagnostics,
            partial: Some(Box::new(concept)),
        });
    }
    Ok(concept)
}

pub(crate) fn resolve(
    worldview: &Worldview,
    request: &CompositionRequest,
    carried: &[Diagnostic],
) -> SemanticResult<Resolution> {
    let backend = worldview.backend();
    let main = &request.main;
    let mut diagnostics = carried.to_vec();

    let traits = validate_traits(worldview, main, &request.traits, &mut diagnostics);
    let modifiers = validate_modifiers(backend, main, &request.modifiers, &mut diagnostics);
    let roles = request.roles.clone();

    let trivial = traits.is_empty()
        && roles.is_empty()
        && modifiers.is_empty()
        && request.operator.is_none()
        && request.collective == main.is_collective();
    if trivial {
        return Ok(Resolution {
            concept: main.clone(),
            diagnostics,
            definition: main.definition().unwrap_or(main.urn()).to_string(),
        });
    }

    let declaration = definition(worldview, request, &traits, &roles, &modifiers)?;
    let definition = declaration.urn();
    let name = canonicalize(main, &traits, &roles, &modifiers, request.collective);
    let namespace = target_namespace(
        main,
        &traits,
        &roles,
        &modifiers,
        &worldview.config().core_namespace,
    );
    let types = concrete_types(backend, request, &traits, &modifiers);

    let mut created = false;
    let concept = worldview.namespaces().intern(
        namespace,
        &name.reference_name,
        &name.display_id,
        backend,
        |urn| {
            let batch = emit_composite(&CompositeDefinition {
                id: urn,
                types: &types,
                display_id: &name.display_id,
                display_label: &name.display_label,
                reference_name: &name.reference_name,
                definition: &definition,
                main,
                traits: &traits,
                roles: &roles,
                modifiers: &modifiers,
            });
            backend.define(batch)?;
            created = true;
            info!("registered {} for '{}'", urn, definition);
            backend
                .get_concept(urn)
                .ok_or_else(|| SemanticError::ConceptNotFound(urn.to_string()))
        },
    )?;

    if created {
        worldview
            .namespaces()
            .record_declaration(concept.urn(), declaration)?;
        if worldview.config().check_satisfiability && !backend.satisfiable(&concept) {
            let message = format!("{} is not satisfiable", concept.urn());
            error!("{}", message);
            let diagnostic =
                Diagnostic::error(DiagnosticKind::Consistency, message).for_declaration(&definition);
            worldview.diagnostics().record(&definition, [diagnostic])?;
        }
    }

    Ok(Resolution {
        concept: concept.with_collective(request.collective),
        diagnostics,
        definition,
    })
}

/// Register the result of a unary operator over `argument`
pub(crate) fn apply_operator(
    worldview: &Worldview,
    operator: UnarySemanticOperator,
    argument: &Concept,
    comparison: Option<&Concept>,
) -> SemanticResult<Concept> {
    let backend = worldview.backend();
    let types = operator
        .apply(argument.types())
        .without(SemanticType::Abstract);
    let display_id = operator.display_id(argument.clean_id(), comparison.map(Concept::clean_id));
    let reference_name = operator.reference_name(
        argument.reference_name(),
        comparison.map(Concept::reference_name),
    );
    let parent = worldview
        .core()
        .get_core_type(&types)?
        .ok_or_else(|| SemanticError::MissingCoreType(format!("{operator} {}", argument.urn())))?;

    let mut created = false;
    let concept = worldview.namespaces().intern(
        argument.namespace(),
        &reference_name,
        &display_id,
        backend,
        |urn| {
            let batch = emit_operator_result(
                urn,
                &types,
                &display_id,
                &reference_name,
                &parent,
                argument,
                comparison,
            );
            backend.define(batch)?;
            created = true;
            info!("registered {} as '{} {}'", urn, operator, argument.urn());
            backend
                .get_concept(urn)
                .ok_or_else(|| SemanticError::ConceptNotFound(urn.to_string()))
        },
    )?;

    if created {
        let argument_declaration = worldview.declaration_of(argument)?;
        let comparison_declaration = comparison
            .map(|c| worldview.declaration_of(c))
            .transpose()?;
        worldview.namespaces().record_declaration(
            concept.urn(),
            argument_declaration.with_operator(operator, comparison_declaration),
        )?;
    }
    Ok(concept)
}

/// Family base of a trait; a core trait is its own base
fn base_trait(worldview: &Worldview, t: &Concept) -> Result<Concept, String> {
    match worldview.backend().base_parent_trait(t) {
        Some(base) => Ok(base),
        None if worldview.config().is_core_namespace(t.namespace()) => Ok(t.clone()),
        None => Err(format!("cannot establish the base trait of {}", t.urn())),
    }
}

fn adopted_traits(backend: &dyn ClassificationBackend, main: &Concept) -> Vec<Concept> {
    let mut adopted: Vec<Concept> = Vec::new();
    for property in TRAIT_PROPERTIES {
        for t in backend.restricted(main, property) {
            if !adopted.contains(&t) {
                adopted.push(t);
            }
        }
    }
    adopted
}

fn validate_traits(
    worldview: &Worldview,
    main: &Concept,
    traits: &[Concept],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Concept> {
    let adopted = adopted_traits(worldview.backend(), main);
    let mut bases: Vec<Concept> = adopted
        .iter()
        .filter(|t| !t.is_abstract())
        .filter_map(|t| base_trait(worldview, t).ok())
        .collect();

    let mut kept = Vec::new();
    for t in traits {
        if t == main || adopted.contains(t) {
            continue;
        }
        let base = match base_trait(worldview, t) {
            Ok(base) => base,
            Err(message) => {
                warn!("{}", message);
                diagnostics.push(Diagnostic::error(DiagnosticKind::Classification, message));
                continue;
            }
        };
        if bases.contains(&base) {
            let message = format!(
                "{} conflicts with another {} trait already attached",
                t.urn(),
                base.urn()
            );
            warn!("{}", message);
            diagnostics.push(Diagnostic::error(DiagnosticKind::Classification, message));
            continue;
        }
        bases.push(base);
        kept.push(t.clone());
    }
    kept
}

fn validate_modifiers(
    backend: &dyn ClassificationBackend,
    main: &Concept,
    modifiers: &BTreeMap<SemanticRole, Concept>,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<SemanticRole, Concept> {
    let mut kept = BTreeMap::new();
    for (role, concept) in modifiers {
        let established = role
            .property()
            .and_then(|property| backend.restricted(main, property).into_iter().next());
        if let Some(existing) = established {
            if !backend.compatible(concept, &existing) {
                let message = format!(
                    "{} is incompatible with {} already established as {} of {}",
                    concept.urn(),
                    existing.urn(),
                    role.keyword(),
                    main.urn()
                );
                warn!("{}", message);
                diagnostics.push(Diagnostic::error(DiagnosticKind::Classification, message));
                continue;
            }
        }
        kept.insert(*role, concept.clone());
    }
    kept
}

/// Main tags with `Abstract` dropped when the composition makes it concrete
fn concrete_types(
    backend: &dyn ClassificationBackend,
    request: &CompositionRequest,
    traits: &[Concept],
    modifiers: &BTreeMap<SemanticRole, Concept>,
) -> TypeSet {
    let main = &request.main;
    let mut types = main.types().clone();
    if !types.is_abstract() {
        return types;
    }
    let concrete = |c: &Concept| !c.is_abstract();

    let remove = if types.is_relationship() {
        matches!(
            (
                modifiers.get(&SemanticRole::RelationshipSource),
                modifiers.get(&SemanticRole::RelationshipTarget),
            ),
            (Some(source), Some(target)) if concrete(source) && concrete(target)
        )
    } else {
        let abstract_traits: Vec<Concept> = adopted_traits(backend, main)
            .into_iter()
            .filter(Concept::is_abstract)
            .collect();
        let concretized = !abstract_traits.is_empty()
            && abstract_traits.iter().all(|general| {
                traits
                    .iter()
                    .any(|t| concrete(t) && backend.subsumes(general, t))
            });

        request.operator.is_some()
            || traits
                .iter()
                .any(|t| t.is(SemanticType::Identity) && concrete(t))
            || concretized
            || modifiers
                .get(&SemanticRole::Inherent)
                .is_some_and(|inherent| concrete(inherent))
    };

    if remove {
        types.remove(SemanticType::Abstract);
    }
    types
}

/// Declaration of the composite: the main declaration with the surviving
/// attachments folded into its modifier fields
fn definition(
    worldview: &Worldview,
    request: &CompositionRequest,
    traits: &[Concept],
    roles: &[Concept],
    modifiers: &BTreeMap<SemanticRole, Concept>,
) -> SemanticResult<Declaration> {
    let main = &request.main;
    let mut declaration = worldview.declaration_of(main)?;
    if declaration.operator.is_some() {
        declaration = Declaration::named(main.namespace(), main.name(), main.types().clone());
    }
    for t in traits {
        let d = worldview.declaration_of(t)?;
        if !declaration.traits.contains(&d) {
            declaration.traits.push(d);
        }
    }
    for r in roles {
        let d = worldview.declaration_of(r)?;
        if !declaration.roles.contains(&d) {
            declaration.roles.push(d);
        }
    }
    for (role, concept) in modifiers {
        declaration
            .modifiers
            .insert(*role, worldview.declaration_of(concept)?);
    }
    declaration.collective |= request.collective;
    Ok(declaration)
}
