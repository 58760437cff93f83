use itertools::Itertools;
use tracing::trace;

use crate::math::{Map, Set};

use super::{Edge, MutableAutomaton, State};

/// Partition of the reachable states of an automaton into strongly connected components. The
/// components are stored in topological order, so an edge leaving a component always leads to
/// a component with a larger position. Within a component, states appear in the order in which
/// they were discovered.
#[derive(Debug, Clone)]
pub struct SccDecomposition<S: State> {
    sccs: Vec<Set<S>>,
    index: Map<S, usize>,
}

impl<S: State> SccDecomposition<S> {
    /// Computes the decomposition of the part of `automaton` that is reachable from its initial
    /// states.
    pub fn new<A>(automaton: &MutableAutomaton<S, A>) -> Self {
        let mut tarjan = Tarjan::default();
        for root in automaton.initial_states() {
            if !tarjan.data.contains_key(root) {
                tarjan.run(automaton, root.clone());
            }
        }

        let sccs = tarjan.components.into_iter().rev().collect_vec();
        let index = sccs
            .iter()
            .enumerate()
            .flat_map(|(i, scc)| scc.iter().map(move |q| (q.clone(), i)))
            .collect();
        trace!("found {} strongly connected components", sccs.len());
        Self { sccs, index }
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.sccs.len()
    }

    /// Returns true if there are no components, which happens only for automata without
    /// initial states.
    pub fn is_empty(&self) -> bool {
        self.sccs.is_empty()
    }

    /// Iterates over the components in topological order.
    pub fn iter(&self) -> impl Iterator<Item = &Set<S>> + '_ {
        self.sccs.iter()
    }

    /// Gives the component at position `i`.
    pub fn get(&self, i: usize) -> Option<&Set<S>> {
        self.sccs.get(i)
    }

    /// Gives the position of the component that contains `state`.
    pub fn index_of(&self, state: &S) -> Option<usize> {
        self.index.get(state).copied()
    }

    /// An edge is transient if its source and successor lie in different components.
    pub fn is_transient_edge(&self, source: &S, successor: &S) -> bool {
        match (self.index_of(source), self.index_of(successor)) {
            (Some(i), Some(j)) => i != j,
            _ => true,
        }
    }

    /// A component is transient if it consists of a single state without a self-loop.
    pub fn is_transient_scc<A>(&self, automaton: &MutableAutomaton<S, A>, i: usize) -> bool {
        let Some(scc) = self.sccs.get(i) else {
            return true;
        };
        automaton.edges_within(scc).next().is_none()
    }

    /// Iterates over all edges whose source and successor lie in the same component.
    pub fn non_transient_edges<'a, A>(
        &'a self,
        automaton: &'a MutableAutomaton<S, A>,
    ) -> impl Iterator<Item = (&'a S, &'a Edge<S>)> + 'a {
        self.sccs
            .iter()
            .flat_map(move |scc| automaton.edges_within(scc))
    }

    /// Calls `f` for every edge that is not transient.
    pub fn for_each_non_transient_edge<A, F: FnMut(&S, &Edge<S>)>(
        &self,
        automaton: &MutableAutomaton<S, A>,
        mut f: F,
    ) {
        self.non_transient_edges(automaton)
            .for_each(|(q, edge)| f(q, edge))
    }
}

#[derive(Debug, Clone, Copy)]
struct TarjanData {
    index: usize,
    lowlink: usize,
    on_stack: bool,
}

/// Iterative variant of Tarjan's algorithm. Components are emitted in reverse topological
/// order.
struct Tarjan<S> {
    counter: usize,
    stack: Vec<S>,
    data: Map<S, TarjanData>,
    components: Vec<Set<S>>,
}

impl<S> Default for Tarjan<S> {
    fn default() -> Self {
        Self {
            counter: 0,
            stack: vec![],
            data: Map::default(),
            components: vec![],
        }
    }
}

impl<S: State> Tarjan<S> {
    fn discover(&mut self, q: S) {
        self.data.insert(
            q.clone(),
            TarjanData {
                index: self.counter,
                lowlink: self.counter,
                on_stack: true,
            },
        );
        self.counter += 1;
        self.stack.push(q);
    }

    fn lower(&mut self, q: &S, to: usize) {
        if let Some(data) = self.data.get_mut(q) {
            data.lowlink = data.lowlink.min(to);
        }
    }

    fn run<A>(&mut self, automaton: &MutableAutomaton<S, A>, root: S) {
        self.discover(root.clone());
        // each frame holds a state and the position of the next edge to explore
        let mut frames: Vec<(S, usize)> = vec![(root, 0)];

        while let Some(top) = frames.len().checked_sub(1) {
            let (q, position) = {
                let (q, position) = &mut frames[top];
                *position += 1;
                (q.clone(), *position - 1)
            };
            let edges = automaton.edges(&q).unwrap_or_default();

            if let Some(edge) = edges.get(position) {
                let successor = edge.successor();
                match self.data.get(successor).copied() {
                    None => {
                        self.discover(successor.clone());
                        frames.push((successor.clone(), 0));
                    }
                    Some(data) if data.on_stack => self.lower(&q, data.index),
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            let data = self.data[&q];
            if let Some((parent, _)) = frames.last() {
                let parent = parent.clone();
                self.lower(&parent, data.lowlink);
            }

            if data.lowlink == data.index {
                let mut component = vec![];
                while let Some(p) = self.stack.pop() {
                    if let Some(data) = self.data.get_mut(&p) {
                        data.on_stack = false;
                    }
                    let done = p == q;
                    component.push(p);
                    if done {
                        break;
                    }
                }
                self.components
                    .push(component.into_iter().rev().collect());
            }
        }
    }
}
