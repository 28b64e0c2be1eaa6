// Copyright 2025 Cowboy AI, LLC.

//! Emergent concepts declared through concept statements

use cim_semantics::{
    Concept, ConceptStatement, InMemoryObservationCatalog, Observable, Observation,
    SemanticType, SemanticsConfig, TriggerDeclaration, Worldview,
};
use pretty_assertions::assert_eq;

fn worldview() -> Worldview {
    let worldview = Worldview::in_memory(SemanticsConfig::default());
    worldview.bootstrap_core().unwrap();
    for (name, keyword) in [
        ("Rain", "process"),
        ("Snowmelt", "process"),
        ("Forest", "thing"),
        ("Grassland", "thing"),
    ] {
        worldview
            .define_concept(&ConceptStatement::from_keyword("eco", name, keyword).unwrap())
            .unwrap();
    }
    worldview
        .define_concept(
            &ConceptStatement::from_keyword("eco", "Flooding", "process")
                .unwrap()
                .with_emergence(TriggerDeclaration::Union(vec![
                    TriggerDeclaration::Urn("eco:Rain".to_string()),
                    TriggerDeclaration::Urn("eco:Snowmelt".to_string()),
                ])),
        )
        .unwrap();
    worldview
        .define_concept(
            &ConceptStatement::from_keyword("eco", "Ecotone", "configuration")
                .unwrap()
                .with_emergence(TriggerDeclaration::Intersection(vec![
                    TriggerDeclaration::Urn("eco:Forest".to_string()),
                    TriggerDeclaration::Urn("eco:Grassland".to_string()),
                ])),
        )
        .unwrap();
    worldview
}

fn observe(worldview: &Worldview, urn: &str) -> Observation {
    Observation::new(Observable::promote(worldview.concept(urn).unwrap()))
}

fn emergents(matches: &[(Concept, Vec<Observation>)]) -> Vec<&str> {
    matches.iter().map(|(c, _)| c.urn()).collect()
}

#[test]
fn test_union_emerges_from_any_operand() {
    let wv = worldview();
    let mut catalog = InMemoryObservationCatalog::new();
    let rain = observe(&wv, "eco:Rain");
    catalog.insert(rain.clone());

    let found = wv.emergence_matches(rain.concept(), &catalog).unwrap();
    assert_eq!(emergents(&found), vec!["eco:Flooding"]);
    assert_eq!(found[0].1, vec![rain]);
}

#[test]
fn test_intersection_needs_every_operand() {
    let wv = worldview();
    let mut catalog = InMemoryObservationCatalog::new();
    let forest = observe(&wv, "eco:Forest");
    catalog.insert(forest.clone());
    assert!(wv
        .emergence_matches(forest.concept(), &catalog)
        .unwrap()
        .is_empty());

    let grassland = observe(&wv, "eco:Grassland");
    catalog.insert(grassland.clone());
    let found = wv.emergence_matches(forest.concept(), &catalog).unwrap();
    assert_eq!(emergents(&found), vec!["eco:Ecotone"]);
    assert_eq!(found[0].1, vec![forest, grassland]);
}

#[test]
fn test_resolved_process_is_not_offered_again() {
    let wv = worldview();
    let mut catalog = InMemoryObservationCatalog::new();
    let snowmelt = observe(&wv, "eco:Snowmelt");
    catalog.insert(snowmelt.clone());
    assert_eq!(
        emergents(&wv.emergent_resolvables(&snowmelt, &catalog).unwrap()),
        vec!["eco:Flooding"]
    );

    catalog.insert(observe(&wv, "eco:Flooding"));
    assert!(wv
        .emergent_resolvables(&snowmelt, &catalog)
        .unwrap()
        .is_empty());
}

#[test]
fn test_abstract_concepts_never_emerge() {
    let wv = worldview();
    let abstract_flood = wv
        .define_concept(
            &ConceptStatement::from_keyword("eco", "Inundation", "process")
                .unwrap()
                .with_tag(SemanticType::Abstract),
        )
        .unwrap();
    let rain = wv.concept("eco:Rain").unwrap();
    let registered = wv
        .register_emergent(
            &abstract_flood,
            vec![cim_semantics::Trigger::Observable(rain)],
        )
        .unwrap();
    assert!(!registered);
}

#[test]
fn test_unknown_trigger_concept_fails_definition() {
    let wv = worldview();
    let statement = ConceptStatement::from_keyword("eco", "Drought", "process")
        .unwrap()
        .with_emergence(TriggerDeclaration::Urn("eco:Heatwave".to_string()));
    assert!(wv.define_concept(&statement).unwrap_err().is_not_found());
}
