use cim_semantics::{
    Concept, ConceptStatement, SemanticsConfig, UnarySemanticOperator, Unit, Worldview,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn setup() -> (Worldview, Vec<Concept>) {
    let worldview = Worldview::in_memory(SemanticsConfig::default());
    worldview.bootstrap_core().unwrap();
    let concepts = [
        ("Biomass", "mass"),
        ("Forest", "thing"),
        ("Rain", "process"),
        ("Dry", "attribute"),
        ("Tropical", "realm"),
        ("Area", "area"),
    ]
    .iter()
    .map(|(name, keyword)| {
        worldview
            .define_concept(&ConceptStatement::from_keyword("geo", *name, keyword).unwrap())
            .unwrap()
    })
    .collect();
    (worldview, concepts)
}

fn benchmark_interned_composite(c: &mut Criterion) {
    let (worldview, concepts) = setup();
    let [biomass, forest, rain, dry, tropical, _] = concepts.as_slice() else {
        unreachable!();
    };

    c.bench_function("build interned composite", |b| {
        b.iter(|| {
            let concept = worldview
                .builder(biomass.clone())
                .of(forest.clone())
                .caused_by(rain.clone())
                .with_traits([dry.clone(), tropical.clone()])
                .build_concept()
                .unwrap();
            black_box(concept)
        })
    });
}

fn benchmark_new_composites(c: &mut Criterion) {
    let mut group = c.benchmark_group("register composites");

    for count in [10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_with_setup(
                || {
                    let (worldview, concepts) = setup();
                    let regions: Vec<Concept> = (0..count)
                        .map(|i| {
                            worldview
                                .define_concept(
                                    &ConceptStatement::from_keyword(
                                        "geo",
                                        format!("Region{i}"),
                                        "thing",
                                    )
                                    .unwrap(),
                                )
                                .unwrap()
                        })
                        .collect();
                    (worldview, concepts, regions)
                },
                |(worldview, concepts, regions)| {
                    for region in regions {
                        let concept = worldview
                            .builder(concepts[0].clone())
                            .of(region)
                            .build_concept()
                            .unwrap();
                        black_box(concept);
                    }
                },
            )
        });
    }

    group.finish();
}

fn benchmark_operator_observable(c: &mut Criterion) {
    let (worldview, concepts) = setup();

    c.bench_function("ratio observable", |b| {
        b.iter(|| {
            let observable = worldview
                .builder(concepts[0].clone())
                .of(concepts[1].clone())
                .with_unit(Unit::new("kg"))
                .apply(UnarySemanticOperator::Ratio, Some(concepts[5].clone()))
                .unwrap()
                .build_observable()
                .unwrap();
            black_box(observable)
        })
    });
}

fn benchmark_declaration_cache(c: &mut Criterion) {
    let (worldview, concepts) = setup();
    let declaration = worldview
        .declaration_of(&concepts[0])
        .unwrap()
        .with_modifier(
            cim_semantics::SemanticRole::Inherent,
            worldview.declaration_of(&concepts[1]).unwrap(),
        );

    c.bench_function("declare cached concept", |b| {
        b.iter(|| black_box(worldview.declare_concept(&declaration).unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_interned_composite,
    benchmark_new_composites,
    benchmark_operator_observable,
    benchmark_declaration_cache
);
criterion_main!(benches);
