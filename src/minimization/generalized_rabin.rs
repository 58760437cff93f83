use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    acceptance::{AcceptanceMask, GeneralizedRabinCondition, OmegaAcceptance},
    automaton::{MutableAutomaton, State},
    math::OrderedSet,
    Show,
};

use super::{
    implication::ImplicationMatrix,
    remap::{remove_and_remap_indices, remove_indices_within},
};

type GeneralizedRabinAutomaton<S> = MutableAutomaton<S, GeneralizedRabinCondition>;

/// Removes the Inf indices of a pair from every edge that also carries the Fin index of that
/// pair. If such an edge is taken infinitely often, the pair rejects anyways. Pairs are checked
/// one after another and every overlapping pair is cleared.
pub fn minimize_overlap<S: State>(automaton: &mut GeneralizedRabinAutomaton<S>) {
    let pairs = automaton
        .acceptance()
        .pairs()
        .iter()
        .filter(|pair| pair.has_fin() && pair.has_inf())
        .cloned()
        .collect_vec();
    if pairs.is_empty() {
        return;
    }

    automaton.update_edges(|_, edge| {
        let mut colors = edge.colors().clone();
        for pair in &pairs {
            if pair.contains_fin(edge.colors()) && pair.contains_inf(edge.colors()) {
                for &inf in pair.infs() {
                    colors.remove(inf);
                }
            }
        }
        colors
    });
}

/// Deletes Inf indices that are, on every edge inside a strongly connected component, the exact
/// complement of the Fin index of their pair.
pub fn minimize_complementary_inf<S: State>(automaton: &mut GeneralizedRabinAutomaton<S>) {
    let mut candidates = automaton
        .acceptance()
        .pairs()
        .iter()
        .filter_map(|pair| {
            let fin = pair.fin()?;
            pair.has_inf()
                .then(|| (fin, pair.infs().iter().copied().collect::<AcceptanceMask>()))
        })
        .collect_vec();
    if candidates.is_empty() {
        return;
    }

    let sccs = automaton.sccs();
    for (_, edge) in sccs.non_transient_edges(automaton) {
        for (fin, complementary) in candidates.iter_mut() {
            let in_fin = edge.in_set(*fin);
            complementary.retain(|inf| in_fin != edge.in_set(inf));
        }
    }

    let mut indices = AcceptanceMask::new();
    for (_, complementary) in &candidates {
        indices.union_with(complementary);
    }
    if !indices.is_empty() {
        debug!("removing complementary indices {}", indices.show());
    }
    remove_and_remap_indices(automaton, &indices);
}

/// Deletes pairs that can never accept: those whose Fin index occurs on every edge inside a
/// strongly connected component and those with an Inf index that occurs on none of them.
/// Additionally, the Fin index of a pair is deleted if it never occurs while all Inf indices of
/// the pair do.
pub fn minimize_globally_irrelevant<S: State>(automaton: &mut GeneralizedRabinAutomaton<S>) {
    let sets = automaton.acceptance().acceptance_sets();
    let sccs = automaton.sccs();

    let mut on_every_edge = AcceptanceMask::full(sets);
    let mut occurring = AcceptanceMask::new();
    sccs.for_each_non_transient_edge(automaton, |_, edge| {
        occurring.union_with(edge.colors());
        on_every_edge.intersect_with(edge.colors());
    });

    let mut impossible = vec![];
    let mut irrelevant_fins = AcceptanceMask::new();
    for pair in automaton.acceptance().pairs() {
        if pair.contains_fin(&on_every_edge)
            || pair.infs().iter().any(|&inf| !occurring.contains(inf))
        {
            impossible.push(pair);
            continue;
        }
        if let Some(fin) = pair.fin() {
            if pair.has_inf() && !occurring.contains(fin) {
                irrelevant_fins.insert(fin);
            }
        }
    }

    let mut indices = irrelevant_fins.clone();
    for pair in &impossible {
        for index in pair.indices() {
            indices.insert(index);
        }
    }
    if !indices.is_empty() {
        debug!(
            "removing impossible pairs {} and irrelevant Fin indices {}",
            impossible.iter().map(|pair| pair.show()).join(", "),
            irrelevant_fins.show()
        );
    }
    remove_and_remap_indices(automaton, &indices);
}

/// Deletes an Inf index if another Inf index of the same pair implies it on all edges inside
/// strongly connected components. Of two indices that imply each other, only one is deleted.
pub fn minimize_edge_implications<S: State>(automaton: &mut GeneralizedRabinAutomaton<S>) {
    let sccs = automaton.sccs();
    let matrix = ImplicationMatrix::from_edges(
        automaton.acceptance().acceptance_sets(),
        sccs.non_transient_edges(automaton).map(|(_, edge)| edge),
    );
    trace!("implications\n{}", matrix.show());

    let mut indices = AcceptanceMask::new();
    for pair in automaton.acceptance().pairs() {
        for &inf in pair.infs() {
            if indices.contains(inf) {
                continue;
            }
            for consequence in matrix.consequences(inf).iter() {
                if consequence != inf && !indices.contains(consequence) && pair.is_inf(consequence)
                {
                    indices.insert(consequence);
                }
            }
        }
    }
    if !indices.is_empty() {
        debug!("removing implied indices {}", indices.show());
    }
    remove_and_remap_indices(automaton, &indices);
}

/// Clears, inside each strongly connected component, the indices of pairs that cannot accept
/// there because one of their Inf indices does not occur in the component.
pub fn minimize_scc_irrelevant<S: State>(automaton: &mut GeneralizedRabinAutomaton<S>) {
    let pairs = automaton.acceptance().pairs().to_vec();
    let sccs = automaton.sccs();
    for scc in sccs.iter() {
        let mut in_scc = AcceptanceMask::new();
        automaton.for_each_edge_within(scc, |_, edge| in_scc.union_with(edge.colors()));

        let mut indices = AcceptanceMask::new();
        for pair in &pairs {
            let active = pair.contains_any(&in_scc);
            if active && pair.infs().iter().any(|&inf| !in_scc.contains(inf)) {
                for index in pair.indices() {
                    indices.insert(index);
                }
            }
        }
        remove_indices_within(automaton, scc, &indices);
    }
}

/// Looks for a pair without Inf indices whose Fin index does not occur in a strongly connected
/// component. Such a pair accepts every run that stays in the component, so all marks inside of
/// it can be cleared. The first such pair is used.
pub fn minimize_trivial<S: State>(automaton: &mut GeneralizedRabinAutomaton<S>) {
    let fin_only = automaton
        .acceptance()
        .pairs()
        .iter()
        .filter(|pair| pair.has_fin() && !pair.has_inf())
        .cloned()
        .collect_vec();
    if fin_only.is_empty() {
        return;
    }

    let sccs = automaton.sccs();
    for scc in sccs.iter() {
        let mut used = AcceptanceMask::new();
        automaton.for_each_edge_within(scc, |_, edge| used.union_with(edge.colors()));
        if let Some(pair) = fin_only.iter().find(|pair| !pair.contains_fin(&used)) {
            trace!("{} accepts trivially in a component", pair.show());
            remove_indices_within(automaton, scc, &used);
        }
    }
}

/// Removes pairs that only accept if another pair accepts as well. The implications between
/// pairs are computed per strongly connected component. A pair that in every component implies a
/// pair which is kept is deleted entirely. Otherwise, a pair that implies another one in a
/// single component loses its Inf indices there. The Fin index has to stay: in a component
/// consisting of one state with a self-loop and acceptance `Fin(0) | Fin(1)`, both pairs imply
/// each other but neither index can be dropped.
pub fn minimize_pair_implications<S: State>(automaton: &mut GeneralizedRabinAutomaton<S>) {
    let pairs = automaton.acceptance().pairs().to_vec();
    let sets = automaton.acceptance().acceptance_sets();
    let sccs = automaton.sccs();

    let implications = sccs
        .iter()
        .enumerate()
        .map(|(i, scc)| {
            let matrix = ImplicationMatrix::from_edges(
                sets,
                automaton.edges_within(scc).map(|(_, edge)| edge),
            );
            let implied = pairs
                .iter()
                .enumerate()
                .cartesian_product(pairs.iter().enumerate())
                .filter(|((a, antecedent), (b, consequent))| {
                    a != b && matrix.pair_implies(antecedent, consequent)
                })
                .map(|((a, _), (b, _))| (a, b))
                .collect_vec();
            trace!("component {i} implications {implied:?}\n{}", matrix.show());
            implied
        })
        .collect_vec();

    let mut removed = vec![false; pairs.len()];
    for antecedent in 0..pairs.len() {
        let implied_everywhere = implications.iter().all(|implied| {
            implied
                .iter()
                .any(|&(a, b)| a == antecedent && !removed[b])
        });
        removed[antecedent] = implied_everywhere;
    }

    for (scc, implied) in sccs.iter().zip(&implications) {
        let mut local = OrderedSet::new();
        for &(a, b) in implied {
            if !removed[a] && !removed[b] && !local.contains(&b) {
                local.insert(a);
            }
        }
        let indices: AcceptanceMask = local
            .iter()
            .flat_map(|&a| pairs[a].infs().iter().copied())
            .collect();
        remove_indices_within(automaton, scc, &indices);
    }

    let indices: AcceptanceMask = pairs
        .iter()
        .zip(&removed)
        .filter(|(_, &is_removed)| is_removed)
        .flat_map(|(pair, _)| pair.indices())
        .collect();
    if !indices.is_empty() {
        debug!("removing implied pairs, dropping {}", indices.show());
    }
    remove_and_remap_indices(automaton, &indices);
}

/// Pairs with a single Inf index whose Fin index is missing or never occurs behave like Büchi
/// conditions, and their disjunction is again a Büchi condition. The first such pair is kept and
/// the Inf indices of all others are rewritten onto its Inf index.
pub fn merge_buchi_type_pairs<S: State>(automaton: &mut GeneralizedRabinAutomaton<S>) {
    let used = automaton.used_indices();
    let buchi_type = automaton
        .acceptance()
        .pairs()
        .iter()
        .filter(|pair| pair.inf_count() == 1 && !pair.contains_fin(&used))
        .collect_vec();
    let Some((representative, others)) = buchi_type.split_first() else {
        return;
    };
    if others.is_empty() {
        return;
    }

    let target = representative.infs()[0];
    let mut merged = AcceptanceMask::new();
    let mut indices = AcceptanceMask::new();
    for pair in others {
        merged.insert(pair.infs()[0]);
        for index in pair.indices() {
            indices.insert(index);
        }
    }
    let count = others.len();

    automaton.update_edges(|_, edge| {
        let mut colors = edge.colors().clone();
        if !colors.is_disjoint(&merged) {
            colors.difference_with(&merged);
            colors.insert(target);
        }
        colors
    });
    debug!("merged {count} Büchi type pairs into one");
    remove_and_remap_indices(automaton, &indices);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptance::{GeneralizedRabinPair, OmegaAcceptance};

    fn masks<S: State>(automaton: &GeneralizedRabinAutomaton<S>) -> Vec<AcceptanceMask> {
        automaton
            .transitions()
            .map(|(_, edge)| edge.colors().clone())
            .collect()
    }

    fn build(
        edges: Vec<(u8, Vec<usize>, u8)>,
        acceptance: GeneralizedRabinCondition,
    ) -> GeneralizedRabinAutomaton<u8> {
        MutableAutomaton::builder()
            .with_initial([0])
            .with_edges(edges)
            .build(acceptance)
            .unwrap()
    }

    fn condition(pairs: &[(Option<usize>, &[usize])]) -> GeneralizedRabinCondition {
        pairs
            .iter()
            .fold(GeneralizedRabinCondition::builder(), |builder, (fin, infs)| {
                builder.pair(*fin, infs.iter().copied())
            })
            .build()
            .unwrap()
    }

    #[test_log::test]
    fn overlap_clears_inf_on_fin_edges() {
        let mut automaton = build(
            vec![(0, vec![], 1), (1, vec![0, 1], 1)],
            condition(&[(Some(0), &[1])]),
        );
        minimize_overlap(&mut automaton);
        assert_eq!(
            masks(&automaton),
            vec![AcceptanceMask::new(), AcceptanceMask::from([0])]
        );
        assert_eq!(automaton.acceptance().acceptance_sets(), 2);
    }

    #[test_log::test]
    fn overlap_checks_every_pair() {
        let mut automaton = build(
            vec![(0, vec![0, 1, 2, 3, 4], 0)],
            condition(&[(Some(0), &[1]), (Some(2), &[3]), (None, &[4])]),
        );
        minimize_overlap(&mut automaton);
        assert_eq!(masks(&automaton), vec![AcceptanceMask::from([0, 2, 4])]);
    }

    #[test_log::test]
    fn complementary_inf_is_deleted() {
        let mut automaton = build(
            vec![(0, vec![0, 2], 1), (1, vec![0], 0), (0, vec![1], 0)],
            condition(&[(Some(0), &[1, 2])]),
        );
        minimize_complementary_inf(&mut automaton);
        // 1 is the complement of 0, 2 is not
        assert_eq!(
            automaton.acceptance().pairs(),
            &[GeneralizedRabinPair::new(Some(0), vec![1])]
        );
        assert_eq!(
            masks(&automaton),
            vec![
                AcceptanceMask::from([0, 1]),
                AcceptanceMask::new(),
                AcceptanceMask::from([0]),
            ]
        );
    }

    #[test_log::test]
    fn globally_irrelevant_pairs_and_fins() {
        let mut automaton = build(
            vec![(0, vec![2, 5], 0), (0, vec![2, 6], 0), (0, vec![1, 4], 1)],
            condition(&[
                (Some(0), &[1]),
                (Some(2), &[3]),
                (Some(4), &[5]),
                (None, &[6]),
            ]),
        );
        minimize_globally_irrelevant(&mut automaton);
        assert_eq!(
            automaton.acceptance().pairs(),
            &[
                GeneralizedRabinPair::new(None, vec![0]),
                GeneralizedRabinPair::new(None, vec![1]),
            ]
        );
        assert_eq!(
            masks(&automaton),
            vec![
                AcceptanceMask::from([0]),
                AcceptanceMask::from([1]),
                AcceptanceMask::new(),
            ]
        );
    }

    #[test_log::test]
    fn fin_only_pair_without_occurrence_survives() {
        let mut automaton = build(
            vec![(0, vec![1], 0)],
            condition(&[(Some(0), &[]), (None, &[1])]),
        );
        minimize_globally_irrelevant(&mut automaton);
        assert_eq!(automaton.acceptance().pair_count(), 2);
    }

    #[test_log::test]
    fn implied_inf_indices_are_deleted() {
        let mut automaton = build(
            vec![(0, vec![0, 1], 0), (0, vec![0, 1, 2], 0), (0, vec![1], 0)],
            condition(&[(None, &[0, 1, 2])]),
        );
        minimize_edge_implications(&mut automaton);
        assert_eq!(
            automaton.acceptance().pairs(),
            &[GeneralizedRabinPair::new(None, vec![0])]
        );
        assert_eq!(
            masks(&automaton),
            vec![
                AcceptanceMask::new(),
                AcceptanceMask::from([0]),
                AcceptanceMask::new(),
            ]
        );
    }

    #[test_log::test]
    fn mutual_implication_keeps_one_index() {
        let mut automaton = build(vec![(0, vec![0, 1], 0)], condition(&[(None, &[0, 1])]));
        minimize_edge_implications(&mut automaton);
        assert_eq!(automaton.acceptance().acceptance_sets(), 1);
        assert_eq!(masks(&automaton), vec![AcceptanceMask::from([0])]);
    }

    #[test_log::test]
    fn scc_irrelevant_pairs_are_cleared_locally() {
        let mut automaton = build(
            vec![(0, vec![0, 1], 0), (0, vec![3], 0), (0, vec![], 1), (1, vec![1, 2], 1)],
            condition(&[(Some(0), &[1, 2]), (None, &[3])]),
        );
        minimize_scc_irrelevant(&mut automaton);
        assert_eq!(
            masks(&automaton),
            vec![
                AcceptanceMask::new(),
                AcceptanceMask::from([3]),
                AcceptanceMask::new(),
                AcceptanceMask::from([1, 2]),
            ]
        );
        assert_eq!(automaton.acceptance().acceptance_sets(), 4);
    }

    #[test_log::test]
    fn trivial_components_are_cleared() {
        let mut automaton = build(
            vec![(0, vec![0, 2], 0), (0, vec![], 1), (1, vec![1, 2], 1)],
            condition(&[(Some(0), &[]), (Some(1), &[2])]),
        );
        minimize_trivial(&mut automaton);
        // the Fin-only pair occurs in the first component, which stays untouched
        assert_eq!(
            masks(&automaton),
            vec![
                AcceptanceMask::from([0, 2]),
                AcceptanceMask::new(),
                AcceptanceMask::new(),
            ]
        );
    }

    #[test_log::test]
    fn globally_implied_pair_is_removed() {
        let mut automaton = build(
            vec![(0, vec![1, 2], 0), (0, vec![2], 0)],
            condition(&[(Some(0), &[1]), (None, &[2])]),
        );
        minimize_pair_implications(&mut automaton);
        assert_eq!(
            automaton.acceptance().pairs(),
            &[GeneralizedRabinPair::new(None, vec![0])]
        );
        assert_eq!(
            masks(&automaton),
            vec![AcceptanceMask::from([0]), AcceptanceMask::from([0])]
        );
    }

    #[test_log::test]
    fn locally_implied_pair_loses_inf_only() {
        let mut automaton = build(
            vec![(0, vec![1, 2], 0), (0, vec![2], 0), (0, vec![], 1), (1, vec![1], 1)],
            condition(&[(Some(0), &[1]), (None, &[2])]),
        );
        minimize_pair_implications(&mut automaton);
        assert_eq!(automaton.acceptance().acceptance_sets(), 3);
        assert_eq!(
            masks(&automaton),
            vec![
                AcceptanceMask::from([2]),
                AcceptanceMask::from([2]),
                AcceptanceMask::new(),
                AcceptanceMask::from([1]),
            ]
        );
    }

    #[test_log::test]
    fn fin_pairs_on_a_self_loop() {
        let mut automaton = build(
            vec![(0, vec![0], 0)],
            condition(&[(Some(0), &[]), (Some(1), &[])]),
        );
        minimize_pair_implications(&mut automaton);
        assert_eq!(
            automaton.acceptance().pairs(),
            &[GeneralizedRabinPair::new(Some(0), vec![])]
        );
        assert_eq!(masks(&automaton), vec![AcceptanceMask::new()]);
    }

    #[test_log::test]
    fn buchi_type_pairs_are_merged() {
        let mut automaton = build(
            vec![
                (0, vec![1], 0),
                (0, vec![3], 0),
                (0, vec![4], 0),
                (0, vec![0, 6, 7], 0),
            ],
            condition(&[
                (Some(0), &[1]),
                (Some(2), &[3]),
                (None, &[4]),
                (Some(5), &[6, 7]),
            ]),
        );
        merge_buchi_type_pairs(&mut automaton);
        assert!(automaton.is_well_formed());
        assert_eq!(automaton.acceptance().acceptance_sets(), 7);
        assert_eq!(automaton.acceptance().pair_count(), 3);
        assert_eq!(
            masks(&automaton),
            vec![
                AcceptanceMask::from([1]),
                AcceptanceMask::from([3]),
                AcceptanceMask::from([3]),
                AcceptanceMask::from([0, 5, 6]),
            ]
        );
    }
}
