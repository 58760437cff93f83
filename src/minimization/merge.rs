use itertools::Itertools;
use tracing::{debug, error, trace};

use crate::{
    acceptance::{AcceptanceMask, GeneralizedRabinCondition, GeneralizedRabinPair},
    automaton::{MutableAutomaton, State},
    math::{OrderedMap, OrderedSet},
    Show,
};

use super::remap::remove_and_remap_indices;

/// A set of pairs that are fused into one. The first pair that was added is the representative,
/// the indices of all other pairs are mapped onto its indices.
#[derive(Debug, Clone)]
pub(crate) struct MergeClass {
    pairs: Vec<usize>,
    active_sccs: OrderedSet<usize>,
    representative_fin: Option<usize>,
    representative_infs: OrderedSet<usize>,
    dead: bool,
}

impl MergeClass {
    fn new(position: usize, pair: &GeneralizedRabinPair, active_sccs: OrderedSet<usize>) -> Self {
        Self {
            pairs: vec![position],
            active_sccs,
            representative_fin: pair.fin(),
            representative_infs: pair.infs().iter().copied().collect(),
            dead: false,
        }
    }

    /// A class can absorb another one if they are never active in the same component and the
    /// representative is at least as strong as the one of `other`.
    fn can_absorb(&self, other: &MergeClass) -> bool {
        self.active_sccs.is_disjoint(&other.active_sccs)
            && !(self.representative_fin.is_none() && other.representative_fin.is_some())
            && self.representative_infs.len() >= other.representative_infs.len()
    }

    /// Computes where the indices of `pair` end up. Its first Inf indices are mapped one to one
    /// onto the representative Inf indices, the last one is mapped onto all remaining ones.
    fn remapping_for(&self, pair: &GeneralizedRabinPair) -> Vec<(usize, AcceptanceMask)> {
        let mut remapping = vec![];
        if let (Some(fin), Some(representative)) = (pair.fin(), self.representative_fin) {
            remapping.push((fin, AcceptanceMask::from([representative])));
        }

        let mut representatives = self.representative_infs.iter().copied();
        if let Some((&last, rest)) = pair.infs().split_last() {
            for &inf in rest {
                remapping.extend(
                    representatives
                        .next()
                        .map(|target| (inf, AcceptanceMask::from([target]))),
                );
            }
            let remaining: AcceptanceMask = representatives.collect();
            if remaining.is_empty() {
                error!("representative of {} has too few Inf indices", self.show());
                panic!("cannot merge {} into its class", pair.show());
            }
            remapping.push((last, remaining));
        }
        remapping
    }
}

impl Show for MergeClass {
    fn show(&self) -> String {
        format!(
            "pairs {} active in {}",
            self.pairs.show(),
            self.active_sccs.show()
        )
    }
}

/// Fuses pairs that are never active in the same strongly connected component. A pair is
/// active in a component if an edge inside of it carries one of its indices. Classes are merged
/// greedily, the scan restarts whenever a class has absorbed others. Merged indices are
/// rewritten onto the representative of their class and then deleted.
pub fn minimize_merge_pairs<S: State>(
    automaton: &mut MutableAutomaton<S, GeneralizedRabinCondition>,
) {
    let pairs = automaton.acceptance().pairs().to_vec();
    if pairs.iter().filter(|pair| pair.has_inf()).count() < 2 {
        return;
    }

    let sccs = automaton.sccs();
    let mut classes = pairs
        .iter()
        .enumerate()
        .filter(|(_, pair)| pair.has_inf())
        .map(|(position, pair)| {
            let active = sccs
                .iter()
                .enumerate()
                .filter(|(_, scc)| {
                    automaton
                        .edges_within(scc)
                        .any(|(_, edge)| pair.contains_any(edge.colors()))
                })
                .map(|(i, _)| i)
                .collect();
            MergeClass::new(position, pair, active)
        })
        .collect_vec();

    loop {
        let mut merged = false;
        for i in 0..classes.len() {
            if classes[i].dead {
                continue;
            }
            for j in 0..classes.len() {
                if i == j || classes[j].dead || !classes[i].can_absorb(&classes[j]) {
                    continue;
                }
                let absorbed = &mut classes[j];
                absorbed.dead = true;
                let absorbed_pairs = std::mem::take(&mut absorbed.pairs);
                let absorbed_sccs = std::mem::take(&mut absorbed.active_sccs);
                classes[i].pairs.extend(absorbed_pairs);
                classes[i].active_sccs.extend(absorbed_sccs);
                merged = true;
            }
            if merged {
                break;
            }
        }
        if !merged {
            break;
        }
    }

    let mut remapping: OrderedMap<usize, AcceptanceMask> = OrderedMap::new();
    for class in classes
        .iter()
        .filter(|class| !class.dead && class.pairs.len() > 1)
    {
        trace!("merging {}", class.show());
        for &position in class.pairs.iter().skip(1) {
            remapping.extend(class.remapping_for(&pairs[position]));
        }
    }
    if remapping.is_empty() {
        return;
    }

    automaton.update_edges(|_, edge| {
        let mut colors = AcceptanceMask::new();
        for index in edge.colors().iter() {
            match remapping.get(&index) {
                Some(targets) => colors.union_with(targets),
                None => {
                    colors.insert(index);
                }
            }
        }
        colors
    });

    let mut indices: AcceptanceMask = remapping.keys().copied().collect();
    for targets in remapping.values() {
        indices.difference_with(targets);
    }
    debug!("merged pairs, dropping {}", indices.show());
    remove_and_remap_indices(automaton, &indices);
}

#[cfg(test)]
mod tests {
    use super::minimize_merge_pairs;
    use crate::acceptance::{
        AcceptanceMask, GeneralizedRabinCondition, GeneralizedRabinPair, OmegaAcceptance,
    };
    use crate::automaton::MutableAutomaton;

    #[test_log::test]
    fn disjoint_pairs_are_fused() {
        let mut automaton = MutableAutomaton::builder()
            .with_initial([0])
            .with_edges([
                (0, vec![1], 0),
                (0, vec![0], 0),
                (0, vec![], 1),
                (1, vec![3], 1),
                (1, vec![2, 3], 1),
            ])
            .build(
                GeneralizedRabinCondition::builder()
                    .pair(Some(0), [1])
                    .pair(Some(2), [3])
                    .build()
                    .unwrap(),
            )
            .unwrap();
        minimize_merge_pairs(&mut automaton);

        assert_eq!(automaton.acceptance().acceptance_sets(), 2);
        assert_eq!(
            automaton.acceptance().pairs(),
            &[GeneralizedRabinPair::new(Some(0), vec![1])]
        );
        let masks = automaton.edges(&1).unwrap().iter().map(|edge| edge.colors().clone());
        assert_eq!(
            masks.collect::<Vec<_>>(),
            vec![AcceptanceMask::from([1]), AcceptanceMask::from([0, 1])]
        );
    }

    #[test_log::test]
    fn leftover_inf_indices_are_shared() {
        let mut automaton = MutableAutomaton::builder()
            .with_initial(['a'])
            .with_edges([
                ('a', vec![0, 1], 'a'),
                ('a', vec![], 'b'),
                ('b', vec![2], 'b'),
            ])
            .build(
                GeneralizedRabinCondition::builder()
                    .pair(None, [0, 1])
                    .pair(None, [2])
                    .build()
                    .unwrap(),
            )
            .unwrap();
        minimize_merge_pairs(&mut automaton);

        assert_eq!(automaton.acceptance().pair_count(), 1);
        assert_eq!(
            automaton.edges(&'b').unwrap()[0].colors(),
            &AcceptanceMask::from([0, 1])
        );
    }

    #[test_log::test]
    fn pairs_sharing_a_component_stay_apart() {
        let mut automaton = MutableAutomaton::builder()
            .with_initial([0])
            .with_edges([(0, vec![1], 0), (0, vec![3], 0)])
            .build(
                GeneralizedRabinCondition::builder()
                    .pair(Some(0), [1])
                    .pair(Some(2), [3])
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let before = automaton.clone();
        minimize_merge_pairs(&mut automaton);
        assert_eq!(automaton.acceptance(), before.acceptance());
    }
}
