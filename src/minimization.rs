//! Every pass takes an automaton by mutable reference and rewrites the marks on its edges and
//! possibly its acceptance condition. A pass never adds or removes states or edges and never
//! changes successors, the only exception being that unreachable states are trimmed whenever
//! indices are deleted. After each pass the automaton accepts the same runs as before.
//!
//! Passes first compute what they want to change by only reading the automaton, and apply the
//! changes afterwards. Deleted indices are compacted immediately with
//! [`remove_and_remap_indices`], so the acceptance condition always declares precisely the
//! indices `0..acceptance_sets()`.
//!
//! The passes are usually not applied individually, instead a [`Pipeline`] runs a fixed
//! sequence of them that fits the type of the acceptance condition.

mod remap;
pub use remap::{remove_and_remap_indices, remove_indices_within, IndexRemapping};

mod implication;
pub use implication::ImplicationMatrix;

mod generic;
pub use generic::remove_transient_acceptance;

mod merge;
pub use merge::minimize_merge_pairs;

mod generalized_rabin;
pub use generalized_rabin::{
    merge_buchi_type_pairs, minimize_complementary_inf, minimize_edge_implications,
    minimize_globally_irrelevant, minimize_overlap, minimize_pair_implications,
    minimize_scc_irrelevant, minimize_trivial,
};

mod pipeline;
pub use pipeline::{
    minimize_default, MinimizationError, MinimizationLevel, ParseLevelError, Pass, Pipeline,
    PipelineError,
};

#[cfg(all(test, feature = "random"))]
mod oracle;
