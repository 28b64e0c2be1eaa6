// Copyright 2025 Cowboy AI, LLC.

//! Canonical naming of composite concepts
//!
//! The three names of a composite depend only on the set of attached
//! concepts, never on the order they were attached in: traits and roles are
//! sorted, positional modifiers follow the [`SemanticRole`] order.

use std::collections::BTreeMap;

use crate::concept::Concept;
use crate::semantic_role::SemanticRole;

/// Names computed for a composite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    /// CamelCase id the URN is minted from
    pub display_id: String,
    /// Label for humans
    pub display_label: String,
    /// Identifier-safe name, also the intern key
    pub reference_name: String,
}

/// Compute the canonical names of a composite
pub fn canonicalize(
    main: &Concept,
    traits: &[Concept],
    roles: &[Concept],
    modifiers: &BTreeMap<SemanticRole, Concept>,
    collective: bool,
) -> CanonicalName {
    let mut display_id = String::new();
    let mut display_label = String::new();
    let mut reference_name = String::new();

    let mut by_id: Vec<&Concept> = traits.iter().collect();
    by_id.sort_by(|a, b| a.clean_id().cmp(b.clean_id()));
    for t in &by_id {
        display_id.push_str(t.clean_id());
        display_label.push_str(t.display_name());
    }
    display_id.push_str(main.clean_id());
    display_label.push_str(main.display_name());

    let mut trait_refs: Vec<&str> = traits.iter().map(Concept::reference_name).collect();
    trait_refs.sort_unstable();
    trait_refs.dedup();
    if !trait_refs.is_empty() {
        reference_name.push_str(&trait_refs.join("_"));
        reference_name.push('_');
    }
    reference_name.push_str(main.reference_name());

    for (role, concept) in modifiers {
        display_id.push_str(role.display_prefix());
        display_id.push_str(concept.clean_id());
        display_label.push_str(role.display_prefix());
        display_label.push_str(concept.display_name());
        reference_name.push_str(role.reference_prefix());
        reference_name.push_str(concept.reference_name());
    }

    if !roles.is_empty() {
        let mut by_id: Vec<&Concept> = roles.iter().collect();
        by_id.sort_by(|a, b| a.clean_id().cmp(b.clean_id()));
        let ids: String = by_id.iter().map(|r| r.clean_id()).collect();
        let labels: String = by_id.iter().map(|r| r.display_name()).collect();
        display_id.push_str(SemanticRole::Role.display_prefix());
        display_id.push_str(&ids);
        display_label = format!("{labels}{display_label}");

        let mut refs: Vec<&str> = roles.iter().map(Concept::reference_name).collect();
        refs.sort_unstable();
        for r in refs {
            reference_name.push_str(SemanticRole::Role.reference_prefix());
            reference_name.push_str(r);
        }
    }

    if collective && !main.is_collective() {
        display_id.insert_str(0, "Each");
        display_label.insert_str(0, "Each");
        reference_name.insert_str(0, "each_");
    }

    CanonicalName {
        display_id,
        display_label,
        reference_name,
    }
}

/// Namespace a composite is registered in.
///
/// The main concept's namespace, unless that is the core namespace; then
/// the first non-core namespace among the attached concepts.
pub fn target_namespace<'a>(
    main: &'a Concept,
    traits: &'a [Concept],
    roles: &'a [Concept],
    modifiers: &'a BTreeMap<SemanticRole, Concept>,
    core_namespace: &str,
) -> &'a str {
    if main.namespace() != core_namespace {
        return main.namespace();
    }
    modifiers
        .values()
        .chain(traits)
        .chain(roles)
        .map(Concept::namespace)
        .find(|ns| *ns != core_namespace)
        .unwrap_or(main.namespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_type::SemanticType;
    use pretty_assertions::assert_eq;

    fn concept(ns: &str, name: &str, keyword: &str) -> Concept {
        Concept::new(ns, name, SemanticType::types_for_keyword(keyword).unwrap())
    }

    #[test]
    fn test_traits_and_modifiers() {
        let biomass = concept("geo", "Biomass", "quantity");
        let dry = concept("geo", "Dry", "attribute");
        let tropical = concept("geo", "Tropical", "realm");
        let mut modifiers = BTreeMap::new();
        modifiers.insert(SemanticRole::Causant, concept("geo", "Rain", "process"));
        modifiers.insert(SemanticRole::Inherent, concept("geo", "Forest", "thing"));

        let name = canonicalize(&biomass, &[tropical, dry], &[], &modifiers, false);
        assert_eq!(name.display_id, "DryTropicalBiomassOfForestFromRain");
        assert_eq!(
            name.reference_name,
            "geo_dry_geo_tropical_geo_biomass_of_geo_forest_from_geo_rain"
        );
    }

    #[test]
    fn test_roles_and_collective() {
        let tree = concept("eco", "Tree", "thing");
        let roles = vec![
            concept("eco", "Seedbank", "role"),
            concept("eco", "Habitat", "role"),
        ];
        let name = canonicalize(&tree, &[], &roles, &BTreeMap::new(), true);
        assert_eq!(name.display_id, "EachTreeAsHabitatSeedbank");
        assert_eq!(name.display_label, "EachHabitatSeedbankTree");
        assert_eq!(name.reference_name, "each_eco_tree_as_eco_habitat_as_eco_seedbank");
    }

    #[test]
    fn test_collective_main_is_prefixed_once() {
        let each_tree = concept("eco", "Tree", "thing").with_collective(true);
        let mut modifiers = BTreeMap::new();
        modifiers.insert(SemanticRole::Inherent, concept("eco", "Region", "region"));
        let name = canonicalize(&each_tree, &[], &[], &modifiers, true);
        assert_eq!(name.display_id, "TreeOfRegion");
        assert!(!name.reference_name.starts_with("each_"));
    }

    #[test]
    fn test_temporal_inherent_prefix() {
        let rain = concept("geo", "Rainfall", "quantity");
        let mut modifiers = BTreeMap::new();
        modifiers.insert(SemanticRole::TemporalInherent, concept("geo", "Season", "event"));
        let name = canonicalize(&rain, &[], &[], &modifiers, false);
        assert_eq!(name.display_id, "RainfallDuringEachSeason");
        assert_eq!(name.reference_name, "geo_rainfall_during_each_geo_season");
    }

    #[test]
    fn test_target_namespace_skips_core() {
        let core = concept("odo", "Presence", "presence");
        let mut modifiers = BTreeMap::new();
        modifiers.insert(SemanticRole::Inherent, concept("geo", "Lake", "thing"));
        assert_eq!(target_namespace(&core, &[], &[], &modifiers, "odo"), "geo");
        assert_eq!(target_namespace(&core, &[], &[], &BTreeMap::new(), "odo"), "odo");

        let local = concept("eco", "Tree", "thing");
        assert_eq!(target_namespace(&local, &[], &[], &modifiers, "odo"), "eco");
    }
}
