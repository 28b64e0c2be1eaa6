// Copyright 2025 Cowboy AI, LLC.

//! Canonical names do not depend on the order of builder calls

use cim_semantics::{Concept, ConceptStatement, ObservableBuilder, SemanticsConfig, Worldview};
use proptest::prelude::*;

struct Fixture {
    worldview: Worldview,
    biomass: Concept,
    forest: Concept,
    rain: Concept,
    summer: Concept,
    dry: Concept,
    tropical: Concept,
}

fn fixture() -> Fixture {
    let worldview = Worldview::in_memory(SemanticsConfig::default());
    worldview.bootstrap_core().unwrap();
    let define = |name: &str, keyword: &str| {
        worldview
            .define_concept(&ConceptStatement::from_keyword("geo", name, keyword).unwrap())
            .unwrap()
    };
    let biomass = define("Biomass", "mass");
    let forest = define("Forest", "thing");
    let rain = define("Rain", "process");
    let summer = define("Summer", "event");
    let dry = define("Dry", "attribute");
    let tropical = define("Tropical", "realm");
    Fixture {
        worldview,
        biomass,
        forest,
        rain,
        summer,
        dry,
        tropical,
    }
}

fn step<'w>(fixture: &Fixture, builder: ObservableBuilder<'w>, index: usize) -> ObservableBuilder<'w> {
    match index {
        0 => builder.of(fixture.forest.clone()),
        1 => builder.caused_by(fixture.rain.clone()),
        2 => builder.during(fixture.summer.clone()),
        3 => builder.with_trait(fixture.dry.clone()),
        _ => builder.with_trait(fixture.tropical.clone()),
    }
}

const EXPECTED: &str = "geo:DryTropicalBiomassOfForestFromRainDuringSummer";

proptest! {
    #[test]
    fn permuted_calls_yield_the_same_concept(
        order in Just(vec![0usize, 1, 2, 3, 4]).prop_shuffle()
    ) {
        let fixture = fixture();
        let builder = fixture.worldview.builder(fixture.biomass.clone());
        let builder = order.iter().fold(builder, |b, i| step(&fixture, b, *i));
        let built = builder.build_concept().unwrap();

        prop_assert_eq!(built.urn(), EXPECTED);
        prop_assert_eq!(fixture.worldview.namespaces().interned_count("geo"), 1);
    }

    #[test]
    fn repeated_builds_are_idempotent(
        orders in proptest::collection::vec(Just(vec![0usize, 1, 2, 3, 4]).prop_shuffle(), 1..5)
    ) {
        let fixture = fixture();
        let mut urns = Vec::new();
        for order in &orders {
            let builder = fixture.worldview.builder(fixture.biomass.clone());
            let builder = order.iter().fold(builder, |b, i| step(&fixture, b, *i));
            urns.push(builder.build_concept().unwrap().urn().to_string());
        }

        prop_assert!(urns.iter().all(|urn| urn == EXPECTED));
        prop_assert_eq!(fixture.worldview.namespaces().interned_count("geo"), 1);
    }
}
