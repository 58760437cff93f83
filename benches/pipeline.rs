use automata_minimize::{
    minimize_default,
    random::{random_generalized_rabin, RandomAutomatonConfig},
    AcceptanceCondition, MinimizationLevel,
};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn bench_pipelines(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipelines");

    let config = RandomAutomatonConfig {
        states: 200,
        out_degree: 3,
        pairs: 6,
        max_infs: 3,
        mark_probability: 0.15,
        seed: 42,
        ..Default::default()
    };
    let automaton =
        random_generalized_rabin(&config).map_acceptance(AcceptanceCondition::GeneralizedRabin);

    for level in [MinimizationLevel::Light, MinimizationLevel::All] {
        group.bench_function(format!("generalized_rabin_{level}"), |b| {
            b.iter_batched(
                || automaton.clone(),
                |automaton| black_box(minimize_default(automaton, level)),
                BatchSize::SmallInput,
            );
        });
    }

    let rabin = random_generalized_rabin(&RandomAutomatonConfig {
        max_infs: 1,
        ..config
    })
    .map_acceptance(AcceptanceCondition::Rabin);
    group.bench_function("rabin", |b| {
        b.iter_batched(
            || rabin.clone(),
            |automaton| black_box(minimize_default(automaton, MinimizationLevel::All)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_pipelines);
criterion_main!(benches);
