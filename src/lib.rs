//! Language-preserving minimization of acceptance conditions on omega-automata.
//!
//! Translations from temporal logic into automata produce transition-based acceptance conditions
//! that are large and highly redundant. This crate takes such an automaton, given as a
//! [`MutableAutomaton`] whose edges carry sets of acceptance indices (see [`AcceptanceMask`]),
//! and rewrites the acceptance marks on its edges together with the acceptance condition itself
//! until fewer indices, fewer pairs and sparser edge marks remain. The accepted language never
//! changes and the graph structure (states and successors) is never touched, only the marks on
//! edges are rewritten and the indices are compacted afterwards.
//!
//! The work is split into individual passes, each of which can be applied on its own, see the
//! [`minimization`] module. Most passes reason about a [`GeneralizedRabinCondition`], that is a
//! disjunction of pairs where each pair consists of an optional Fin index and a (possibly empty)
//! list of Inf indices. The passes only use local information on edges together with the
//! decomposition of the automaton into strongly connected components, see [`SccDecomposition`].
//!
//! For everyday use, [`minimize_default`] picks a fixed sequence of passes that fits the type of
//! acceptance condition and applies it:
//! ```
//! use automata_minimize::prelude::*;
//!
//! let acceptance = GeneralizedRabinCondition::builder()
//!     .pair(Some(0), [1])
//!     .build()
//!     .unwrap();
//! let automaton = MutableAutomaton::builder()
//!     .with_initial([0])
//!     .with_edges([(0, vec![], 1), (1, vec![0, 1], 1)])
//!     .build(AcceptanceCondition::GeneralizedRabin(acceptance))
//!     .unwrap();
//!
//! let minimized = minimize_default(automaton, MinimizationLevel::All);
//! assert!(minimized.acceptance().acceptance_sets() <= 2);
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_minimize::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        acceptance::{
            AcceptanceCondition, AcceptanceError, AcceptanceKind, AcceptanceMask,
            GeneralizedRabinCondition, GeneralizedRabinPair, OmegaAcceptance, ParityCondition,
            ParityKind, RemoveIndices,
        },
        automaton::{AutomatonError, Edge, MutableAutomaton, SccDecomposition, State},
        minimization::{
            minimize_default, MinimizationError, MinimizationLevel, Pass, Pipeline,
            PipelineError,
        },
        math, Show,
    };
}

/// Collection types that are used throughout the crate. All unordered collections preserve
/// insertion order so that every pass behaves deterministically.
pub mod math;

/// Acceptance conditions and the sets of acceptance indices that edges are marked with.
pub mod acceptance;
pub use acceptance::{AcceptanceCondition, AcceptanceMask, GeneralizedRabinCondition};

/// Mutable automata whose edges carry acceptance marks, together with their decomposition into
/// strongly connected components.
pub mod automaton;
pub use automaton::{MutableAutomaton, SccDecomposition};

/// The minimization passes and the pipelines that combine them.
pub mod minimization;
pub use minimization::{minimize_default, MinimizationLevel};

/// Implements the generation of random automata with generalized Rabin acceptance.
#[cfg(feature = "random")]
pub mod random;

use itertools::Itertools;

/// Helper trait which can be used to display states, edges, acceptance conditions and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for an acceptance mask this should
    /// for example be `{0, 2}`. This is mainly used for logging.
    fn show(&self) -> String;
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl<S: Show> Show for Option<S> {
    fn show(&self) -> String {
        match self {
            None => "#".to_string(),
            Some(x) => x.show(),
        }
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        format!("[{}]", self.iter().map(|x| x.show()).join(", "))
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        self.as_slice().show()
    }
}

impl<S: Show> Show for std::collections::BTreeSet<S> {
    fn show(&self) -> String {
        format!("{{{}}}", self.iter().map(|x| x.show()).join(", "))
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}
