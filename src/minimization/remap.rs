use tracing::{debug, trace};

use crate::{
    acceptance::{AcceptanceMask, RemoveIndices},
    automaton::{MutableAutomaton, State},
    math::Set,
    Show,
};

/// What happens to an acceptance index when indices are deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRemapping {
    /// The index survives and is renamed to the contained index.
    Kept(usize),
    /// The index is deleted.
    Removed,
}

impl IndexRemapping {
    /// Computes the remapping for all indices in `0..sets`. Surviving indices are numbered
    /// contiguously in ascending order.
    pub fn table(sets: usize, removed: &AcceptanceMask) -> Vec<IndexRemapping> {
        let mut next = 0;
        (0..sets)
            .map(|index| {
                if removed.contains(index) {
                    IndexRemapping::Removed
                } else {
                    next += 1;
                    IndexRemapping::Kept(next - 1)
                }
            })
            .collect()
    }

    /// Gives the new index, if the index survives.
    pub fn kept(self) -> Option<usize> {
        match self {
            IndexRemapping::Kept(index) => Some(index),
            IndexRemapping::Removed => None,
        }
    }
}

/// Applies a remapping table to a mask. Indices outside of the table are dropped.
pub(crate) fn remap_mask(mask: &AcceptanceMask, table: &[IndexRemapping]) -> AcceptanceMask {
    mask.iter()
        .filter_map(|index| table.get(index).and_then(|remapping| remapping.kept()))
        .collect()
}

/// Deletes the given indices from every edge and from the acceptance condition, and renumbers
/// the remaining ones. Both sides are rewritten with the same table, so the automaton stays
/// consistent with its acceptance. Finally, unreachable states are trimmed. If there is nothing
/// to delete, only the trimming takes place.
pub fn remove_and_remap_indices<S: State, A: RemoveIndices>(
    automaton: &mut MutableAutomaton<S, A>,
    indices: &AcceptanceMask,
) {
    if indices.is_empty() {
        automaton.trim();
        return;
    }

    let sets = automaton.acceptance().acceptance_sets();
    let table = IndexRemapping::table(sets, indices);
    debug!("removing acceptance indices {}", indices.show());
    trace!("remapping {:?}", table);

    automaton.update_edges(|_, edge| remap_mask(edge.colors(), &table));
    automaton
        .acceptance_mut()
        .remove_indices(|index| indices.contains(index));
    automaton.trim();
}

/// Clears the given indices from every edge whose source and successor both lie in `states`.
/// Nothing is renumbered and the acceptance condition stays unchanged.
pub fn remove_indices_within<S: State, A>(
    automaton: &mut MutableAutomaton<S, A>,
    states: &Set<S>,
    indices: &AcceptanceMask,
) {
    if indices.is_empty() || states.is_empty() {
        return;
    }
    trace!(
        "clearing indices {} on {} states",
        indices.show(),
        states.len()
    );
    automaton.update_edges_in(states, |_, edge| {
        let mut colors = edge.colors().clone();
        if states.contains(edge.successor()) {
            colors.difference_with(indices);
        }
        colors
    });
}
