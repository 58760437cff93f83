//! Checks that minimization preserves the accepted language on random automata. A run of an
//! automaton eventually stays within a strongly connected set of edges and visits each of them
//! infinitely often, so two automata with the same graph accept the same runs if and only if
//! every strongly connected set of edges gets the same verdict.

use itertools::Itertools;

use crate::{
    acceptance::{AcceptanceCondition, AcceptanceKind, AcceptanceMask, OmegaAcceptance},
    automaton::MutableAutomaton,
    math::Set,
    random::{random_generalized_rabin, RandomAutomatonConfig},
};

use super::{minimize_default, MinimizationLevel, Pass, Pipeline};

fn edge_list<A>(automaton: &MutableAutomaton<usize, A>) -> Vec<(usize, usize, AcceptanceMask)> {
    automaton
        .transitions()
        .map(|(source, edge)| (*source, *edge.successor(), edge.colors().clone()))
        .collect()
}

fn is_strongly_connected(edges: &[&(usize, usize, AcceptanceMask)]) -> bool {
    let nodes: Set<usize> = edges.iter().flat_map(|(p, q, _)| [*p, *q]).collect();
    let reaches_all = |forward: bool| {
        let mut seen = Set::default();
        let mut queue = vec![nodes[0]];
        while let Some(q) = queue.pop() {
            if !seen.insert(q) {
                continue;
            }
            for (source, successor, _) in edges {
                let (from, to) = match forward {
                    true => (*source, *successor),
                    false => (*successor, *source),
                };
                if from == q {
                    queue.push(to);
                }
            }
        }
        seen.len() == nodes.len()
    };
    reaches_all(true) && reaches_all(false)
}

/// Gives the verdict for every strongly connected set of edges, in a fixed order, together with
/// the successors of all edges.
fn verdicts<A: OmegaAcceptance>(
    automaton: &MutableAutomaton<usize, A>,
) -> (Vec<(usize, usize)>, Vec<bool>) {
    let edges = edge_list(automaton);
    assert!(edges.len() <= 14, "too many edges to enumerate");
    let verdicts = edges
        .iter()
        .powerset()
        .filter(|subset| !subset.is_empty() && is_strongly_connected(subset))
        .map(|subset| {
            let mut seen = AcceptanceMask::new();
            for (_, _, colors) in subset {
                seen.union_with(colors);
            }
            automaton.acceptance().accepts(&seen)
        })
        .collect();
    let graph = edges.into_iter().map(|(p, q, _)| (p, q)).collect();
    (graph, verdicts)
}

fn small(seed: u64, max_infs: usize) -> RandomAutomatonConfig {
    RandomAutomatonConfig {
        states: 4,
        out_degree: 2,
        pairs: 3,
        max_infs,
        fin_probability: 0.7,
        mark_probability: 0.35,
        seed,
    }
}

const ALL_PASSES: [Pass; 10] = [
    Pass::Overlap,
    Pass::RemoveTransientAcceptance,
    Pass::ComplementaryInf,
    Pass::GloballyIrrelevant,
    Pass::EdgeImplications,
    Pass::MergePairs,
    Pass::SccIrrelevant,
    Pass::Trivial,
    Pass::PairImplications,
    Pass::MergeBuchiTypePairs,
];

#[test]
fn every_pass_preserves_the_language() {
    for pass in ALL_PASSES {
        for seed in 0..150 {
            for max_infs in [1, 2] {
                let mut automaton = random_generalized_rabin(&small(seed, max_infs));
                automaton.trim();
                let sets = automaton.acceptance().acceptance_sets();
                let before = verdicts(&automaton);

                pass.apply_generalized_rabin(&mut automaton);
                automaton.trim();

                assert!(automaton.is_well_formed(), "{pass} on seed {seed}");
                assert!(automaton.acceptance().acceptance_sets() <= sets);
                assert_eq!(before, verdicts(&automaton), "{pass} on seed {seed}");
            }
        }
    }
}

#[test_log::test]
fn default_pipelines_preserve_the_language() {
    for seed in 0..200 {
        for (max_infs, level) in [
            (1, MinimizationLevel::All),
            (2, MinimizationLevel::Light),
            (3, MinimizationLevel::All),
        ] {
            let mut automaton = random_generalized_rabin(&small(seed, max_infs))
                .map_acceptance(|gra| match max_infs {
                    1 => AcceptanceCondition::Rabin(gra),
                    _ => AcceptanceCondition::GeneralizedRabin(gra),
                });
            automaton.trim();
            let kind = automaton.acceptance().kind();
            let sets = automaton.acceptance().acceptance_sets();
            let before = verdicts(&automaton);

            let minimized = minimize_default(automaton, level);

            assert_eq!(minimized.acceptance().kind(), kind);
            assert!(minimized.acceptance().acceptance_sets() <= sets);
            assert_eq!(before, verdicts(&minimized), "seed {seed}");
        }
    }
}

#[test]
fn repeated_minimization_never_grows() {
    for seed in 0..50 {
        let automaton = random_generalized_rabin(&small(seed, 2))
            .map_acceptance(AcceptanceCondition::GeneralizedRabin);
        let once = minimize_default(automaton, MinimizationLevel::All);
        let sets = once.acceptance().acceptance_sets();
        let pairs = once.acceptance().as_generalized_rabin().map(|gra| gra.pair_count());
        let before = verdicts(&once);

        let twice = minimize_default(once, MinimizationLevel::All);
        assert!(twice.acceptance().acceptance_sets() <= sets);
        assert!(twice.acceptance().as_generalized_rabin().map(|gra| gra.pair_count()) <= pairs);
        assert_eq!(before, verdicts(&twice));
    }
}

#[test]
fn generalized_rabin_pipeline_runs_on_rabin_input() {
    let pipeline = Pipeline::new(AcceptanceKind::GeneralizedRabin, MinimizationLevel::All)
        .expect("generalized Rabin conditions have a pipeline");
    for seed in 0..50 {
        let mut automaton = random_generalized_rabin(&small(seed, 1))
            .map_acceptance(AcceptanceCondition::Rabin);
        automaton.trim();
        let before = verdicts(&automaton);
        let minimized = pipeline.run(automaton).unwrap();
        assert_eq!(minimized.acceptance().kind(), AcceptanceKind::Rabin);
        assert_eq!(before, verdicts(&minimized));
    }
}

#[test]
fn buchi_automata_are_left_alone() {
    let automaton = MutableAutomaton::builder()
        .with_initial([0])
        .with_edges([(0, vec![0], 1), (1, vec![], 0), (2, vec![0], 2)])
        .build(AcceptanceCondition::Buchi)
        .unwrap();
    let minimized = minimize_default(automaton.clone(), MinimizationLevel::All);
    assert_eq!(edge_list(&minimized), edge_list(&automaton));
    assert_eq!(minimized.size(), 3);
}

#[test]
fn passes_are_idempotent() {
    let passes = ALL_PASSES
        .into_iter()
        .filter(|pass| !matches!(pass, Pass::MergePairs));
    for pass in passes {
        for seed in 0..100 {
            let mut automaton = random_generalized_rabin(&small(seed, 2));
            automaton.trim();
            pass.apply_generalized_rabin(&mut automaton);
            automaton.trim();
            let edges = edge_list(&automaton);
            let acceptance = automaton.acceptance().clone();

            pass.apply_generalized_rabin(&mut automaton);
            automaton.trim();
            assert_eq!(edge_list(&automaton), edges, "{pass} on seed {seed}");
            assert_eq!(automaton.acceptance(), &acceptance, "{pass} on seed {seed}");
        }
    }
}
