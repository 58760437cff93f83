use tracing::trace;

use crate::{
    acceptance::{AcceptanceMask, OmegaAcceptance},
    automaton::{MutableAutomaton, State},
};

/// Clears the marks of every edge whose source and successor lie in different strongly
/// connected components. Such an edge is taken at most once along any run, so its marks never
/// influence acceptance. Works for every type of acceptance condition.
pub fn remove_transient_acceptance<S: State, A: OmegaAcceptance>(
    automaton: &mut MutableAutomaton<S, A>,
) {
    let sccs = automaton.sccs();
    let mut cleared = 0;
    automaton.update_edges(|q, edge| {
        if edge.has_acceptance() && sccs.is_transient_edge(q, edge.successor()) {
            cleared += 1;
            AcceptanceMask::new()
        } else {
            edge.colors().clone()
        }
    });
    trace!("cleared the marks of {cleared} transient edges");
}

#[cfg(test)]
mod tests {
    use super::remove_transient_acceptance;
    use crate::acceptance::{AcceptanceMask, ParityCondition, ParityKind};
    use crate::automaton::MutableAutomaton;

    #[test_log::test]
    fn transient_marks_are_cleared() {
        let mut automaton = MutableAutomaton::builder()
            .with_initial(['a'])
            .with_edges([
                ('a', vec![0], 'a'),
                ('a', vec![1], 'b'),
                ('b', vec![2], 'c'),
                ('c', vec![1], 'b'),
                ('c', vec![0, 2], 'd'),
                ('d', vec![], 'd'),
            ])
            .build(ParityCondition::new(ParityKind::MinEven, 3))
            .unwrap();
        let sccs = automaton.sccs();
        let before = automaton.clone();
        remove_transient_acceptance(&mut automaton);

        for ((q, old), (_, new)) in before.transitions().zip(automaton.transitions()) {
            if sccs.is_transient_edge(q, old.successor()) {
                assert!(new.colors().is_empty());
            } else {
                assert_eq!(old.colors(), new.colors());
            }
        }
        assert_eq!(
            automaton.edges(&'c').unwrap()[1].colors(),
            &AcceptanceMask::new()
        );
    }
}
