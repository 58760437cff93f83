use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    acceptance::{AcceptanceCondition, AcceptanceMask, OmegaAcceptance},
    math::{Map, Set},
    Show,
};

mod scc;
pub use scc::SccDecomposition;

/// A state is an opaque value that can be cloned, compared and hashed. Every type that
/// satisfies these bounds can be used as a state.
pub trait State: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> State for T {}

/// Abstracts the types of errors that can occur when constructing a [`MutableAutomaton`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AutomatonError {
    /// An edge refers to a state that is not part of the automaton.
    #[error("state {0} is not part of the automaton")]
    UnknownState(String),
    /// An edge is marked with an index that the acceptance condition does not declare.
    #[error("edge from {state} is marked with {index}, but there are only {sets} acceptance sets")]
    IndexOutOfRange {
        /// the source state of the offending edge
        state: String,
        /// the offending index
        index: usize,
        /// the number of acceptance sets
        sets: usize,
    },
}

/// An outgoing edge, consisting of the successor state and the acceptance indices the edge is
/// marked with.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Edge<S> {
    successor: S,
    colors: AcceptanceMask,
}

impl<S> Edge<S> {
    /// Creates a new edge leading to `successor` that is marked with `colors`.
    pub fn new(successor: S, colors: AcceptanceMask) -> Self {
        Self { successor, colors }
    }

    /// Returns the successor state.
    pub fn successor(&self) -> &S {
        &self.successor
    }

    /// Returns the acceptance indices of the edge.
    pub fn colors(&self) -> &AcceptanceMask {
        &self.colors
    }

    /// Returns true if the edge is marked with `index`.
    pub fn in_set(&self, index: usize) -> bool {
        self.colors.contains(index)
    }

    /// Returns true if the edge is marked with at least one index.
    pub fn has_acceptance(&self) -> bool {
        !self.colors.is_empty()
    }
}

impl<S: Debug> Debug for Edge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "-{}-> {:?}", self.colors.show(), self.successor)
    }
}

/// An automaton with mutable acceptance marks. States are stored in insertion order together
/// with their outgoing edges, so iterating over states and edges is deterministic. The set of
/// states and successors can only grow through [`MutableAutomaton::add_state`] and
/// [`MutableAutomaton::add_edge`] and only shrink through [`MutableAutomaton::trim`], all other
/// mutations only concern the acceptance marks of edges.
#[derive(Clone)]
pub struct MutableAutomaton<S: State, A = AcceptanceCondition> {
    states: Map<S, Vec<Edge<S>>>,
    initial: Set<S>,
    acceptance: A,
}

impl<S: State> MutableAutomaton<S, AcceptanceCondition> {
    /// Gives a builder for an automaton with states of type `S`.
    pub fn builder() -> AutomatonBuilder<S> {
        AutomatonBuilder::default()
    }
}

impl<S: State, A> MutableAutomaton<S, A> {
    /// Creates an automaton without states that uses the given acceptance condition.
    pub fn new(acceptance: A) -> Self {
        Self {
            states: Map::default(),
            initial: Set::default(),
            acceptance,
        }
    }

    /// Adds a state without edges, returns false if it was present already.
    pub fn add_state(&mut self, state: S) -> bool {
        if self.states.contains_key(&state) {
            return false;
        }
        self.states.insert(state, Vec::new());
        true
    }

    /// Adds `state` and marks it as initial.
    pub fn add_initial_state(&mut self, state: S) {
        self.add_state(state.clone());
        self.initial.insert(state);
    }

    /// Adds an edge from `source`. Both `source` and the successor of `edge` must exist.
    pub fn add_edge(&mut self, source: &S, edge: Edge<S>) -> Result<(), AutomatonError> {
        if !self.states.contains_key(edge.successor()) {
            return Err(AutomatonError::UnknownState(format!("{:?}", edge.successor())));
        }
        let Some(edges) = self.states.get_mut(source) else {
            return Err(AutomatonError::UnknownState(format!("{source:?}")));
        };
        edges.push(edge);
        Ok(())
    }

    /// Iterates over all states in insertion order.
    pub fn states(&self) -> impl Iterator<Item = &S> + '_ {
        self.states.keys()
    }

    /// Iterates over all initial states.
    pub fn initial_states(&self) -> impl Iterator<Item = &S> + '_ {
        self.initial.iter()
    }

    /// Returns true if `state` is part of the automaton.
    pub fn contains_state(&self, state: &S) -> bool {
        self.states.contains_key(state)
    }

    /// Returns the outgoing edges of `state`, or `None` if the state does not exist.
    pub fn edges(&self, state: &S) -> Option<&[Edge<S>]> {
        self.states.get(state).map(|edges| edges.as_slice())
    }

    /// Iterates over the successors of `state`.
    pub fn successors<'a>(&'a self, state: &S) -> impl Iterator<Item = &'a S> + 'a {
        self.edges(state)
            .unwrap_or_default()
            .iter()
            .map(|edge| edge.successor())
    }

    /// Iterates over all pairs of source state and outgoing edge.
    pub fn transitions(&self) -> impl Iterator<Item = (&S, &Edge<S>)> + '_ {
        self.states
            .iter()
            .flat_map(|(q, edges)| edges.iter().map(move |edge| (q, edge)))
    }

    /// Iterates over all edges whose source and successor lie in `states`.
    pub fn edges_within<'a>(
        &'a self,
        states: &'a Set<S>,
    ) -> impl Iterator<Item = (&'a S, &'a Edge<S>)> + 'a {
        states
            .iter()
            .filter_map(move |q| self.states.get_key_value(q))
            .flat_map(move |(q, edges)| {
                edges
                    .iter()
                    .filter(|edge| states.contains(edge.successor()))
                    .map(move |edge| (q, edge))
            })
    }

    /// Calls `f` for every edge of the automaton.
    pub fn for_each_edge<F: FnMut(&S, &Edge<S>)>(&self, mut f: F) {
        self.transitions().for_each(|(q, edge)| f(q, edge))
    }

    /// Calls `f` for every edge whose source and successor lie in `states`.
    pub fn for_each_edge_within<F: FnMut(&S, &Edge<S>)>(&self, states: &Set<S>, mut f: F) {
        self.edges_within(states).for_each(|(q, edge)| f(q, edge))
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.states.values().map(|edges| edges.len()).sum()
    }

    /// Returns the acceptance condition.
    pub fn acceptance(&self) -> &A {
        &self.acceptance
    }

    /// Gives mutable access to the acceptance condition. Callers must keep the marks on the
    /// edges consistent with it.
    pub(crate) fn acceptance_mut(&mut self) -> &mut A {
        &mut self.acceptance
    }

    /// Replaces the acceptance condition by applying `f` to it. The resulting automaton may use
    /// a different type of acceptance condition.
    pub fn map_acceptance<B, F: FnOnce(A) -> B>(self, f: F) -> MutableAutomaton<S, B> {
        MutableAutomaton {
            states: self.states,
            initial: self.initial,
            acceptance: f(self.acceptance),
        }
    }

    /// Like [`Self::map_acceptance`], but `f` may refuse the conversion by handing the acceptance
    /// condition back. In that case the automaton is returned unchanged as the error.
    pub fn try_map_acceptance<B, F>(self, f: F) -> Result<MutableAutomaton<S, B>, Self>
    where
        F: FnOnce(A) -> Result<B, A>,
    {
        let MutableAutomaton {
            states,
            initial,
            acceptance,
        } = self;
        match f(acceptance) {
            Ok(acceptance) => Ok(MutableAutomaton {
                states,
                initial,
                acceptance,
            }),
            Err(acceptance) => Err(MutableAutomaton {
                states,
                initial,
                acceptance,
            }),
        }
    }

    /// Replaces the acceptance marks of every edge by the result of `f`. Successors remain
    /// untouched.
    pub fn update_edges<F>(&mut self, mut f: F)
    where
        F: FnMut(&S, &Edge<S>) -> AcceptanceMask,
    {
        for (q, edges) in self.states.iter_mut() {
            for edge in edges.iter_mut() {
                let colors = f(q, edge);
                edge.colors = colors;
            }
        }
    }

    /// Works like [`Self::update_edges`], but only for the outgoing edges of states in
    /// `states`.
    pub fn update_edges_in<F>(&mut self, states: &Set<S>, mut f: F)
    where
        F: FnMut(&S, &Edge<S>) -> AcceptanceMask,
    {
        for q in states {
            let Some((_, q, edges)) = self.states.get_full_mut(q) else {
                continue;
            };
            for edge in edges.iter_mut() {
                let colors = f(q, edge);
                edge.colors = colors;
            }
        }
    }

    /// Returns the union of all acceptance marks that occur on some edge.
    pub fn used_indices(&self) -> AcceptanceMask {
        let mut used = AcceptanceMask::new();
        self.for_each_edge(|_, edge| used.union_with(edge.colors()));
        used
    }

    /// Computes the states that are reachable from some initial state, in the order of a
    /// breadth-first search.
    pub fn reachable_states(&self) -> Set<S> {
        let mut seen: Set<S> = self.initial.iter().cloned().collect();
        let mut queue: VecDeque<S> = seen.iter().cloned().collect();
        while let Some(q) = queue.pop_front() {
            for successor in self.successors(&q) {
                if seen.insert(successor.clone()) {
                    queue.push_back(successor.clone());
                }
            }
        }
        seen
    }

    /// Removes all states that are not reachable from an initial state and returns how many
    /// were removed.
    pub fn trim(&mut self) -> usize {
        let reachable = self.reachable_states();
        let before = self.states.len();
        self.states.retain(|q, _| reachable.contains(q));
        let removed = before - self.states.len();
        if removed > 0 {
            debug!("trimmed {removed} unreachable states");
        }
        removed
    }

    /// Computes the decomposition into strongly connected components of the reachable part.
    pub fn sccs(&self) -> SccDecomposition<S> {
        SccDecomposition::new(self)
    }
}

impl<S: State, A: OmegaAcceptance> MutableAutomaton<S, A> {
    /// Checks that every acceptance mark is declared by the acceptance condition.
    pub fn is_well_formed(&self) -> bool {
        self.transitions()
            .all(|(_, edge)| self.acceptance.is_well_formed_mask(edge.colors()))
    }

    pub(crate) fn validate(&self) -> Result<(), AutomatonError> {
        for (q, edge) in self.transitions() {
            if let Some(index) = edge
                .colors()
                .iter()
                .find(|&i| i >= self.acceptance.acceptance_sets())
            {
                return Err(AutomatonError::IndexOutOfRange {
                    state: format!("{q:?}"),
                    index,
                    sets: self.acceptance.acceptance_sets(),
                });
            }
        }
        Ok(())
    }
}

impl<S: State, A: Debug> Debug for MutableAutomaton<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "acceptance: {:?}", self.acceptance)?;
        writeln!(f, "initial: {}", self.initial.iter().map(|q| format!("{q:?}")).join(", "))?;
        for (q, edges) in &self.states {
            writeln!(
                f,
                "{q:?}: {}",
                edges.iter().map(|edge| format!("{edge:?}")).join(", ")
            )?;
        }
        Ok(())
    }
}

/// Helper struct for the construction of a [`MutableAutomaton`] from lists of states and edges.
/// States are added in the order in which they are first mentioned.
#[derive(Debug, Clone)]
pub struct AutomatonBuilder<S> {
    initial: Vec<S>,
    states: Vec<S>,
    edges: Vec<(S, AcceptanceMask, S)>,
}

impl<S> Default for AutomatonBuilder<S> {
    fn default() -> Self {
        Self {
            initial: vec![],
            states: vec![],
            edges: vec![],
        }
    }
}

impl<S: State> AutomatonBuilder<S> {
    /// Marks the given states as initial.
    pub fn with_initial<I: IntoIterator<Item = S>>(mut self, initial: I) -> Self {
        self.initial.extend(initial);
        self
    }

    /// Adds states, which may not have any edges.
    pub fn with_states<I: IntoIterator<Item = S>>(mut self, states: I) -> Self {
        self.states.extend(states);
        self
    }

    /// Adds edges given as triples of source, acceptance indices and successor.
    pub fn with_edges<I, M>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (S, M, S)>,
        M: IntoIterator<Item = usize>,
    {
        self.edges.extend(
            edges
                .into_iter()
                .map(|(source, colors, target)| (source, colors.into_iter().collect(), target)),
        );
        self
    }

    /// Builds the automaton, fails if an edge is marked with an index that `acceptance` does
    /// not declare.
    pub fn build<A: OmegaAcceptance>(
        self,
        acceptance: A,
    ) -> Result<MutableAutomaton<S, A>, AutomatonError> {
        let mut automaton = MutableAutomaton::new(acceptance);
        for q in self.states {
            automaton.add_state(q);
        }
        for q in self.initial {
            automaton.add_initial_state(q);
        }
        for (source, _, target) in &self.edges {
            automaton.add_state(source.clone());
            automaton.add_state(target.clone());
        }
        for (source, colors, target) in self.edges {
            automaton.add_edge(&source, Edge::new(target, colors))?;
        }
        automaton.validate()?;
        trace!("built automaton\n{automaton:?}");
        Ok(automaton)
    }
}
