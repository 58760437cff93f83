use std::{fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{debug, error, trace};

use crate::{
    acceptance::{
        AcceptanceCondition, AcceptanceError, AcceptanceKind, GeneralizedRabinCondition,
        OmegaAcceptance,
    },
    automaton::{MutableAutomaton, State},
};

use super::{
    generalized_rabin::{
        merge_buchi_type_pairs, minimize_complementary_inf, minimize_edge_implications,
        minimize_globally_irrelevant, minimize_overlap, minimize_pair_implications,
        minimize_scc_irrelevant, minimize_trivial,
    },
    generic::remove_transient_acceptance,
    merge::minimize_merge_pairs,
};

/// Error that is raised when a pipeline is applied to an automaton it was not made for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinimizationError {
    /// The acceptance condition of the automaton has a different type than the pipeline.
    #[error("pipeline for {expected} acceptance cannot run on {found} acceptance")]
    AcceptanceMismatch {
        /// the type the pipeline was made for
        expected: AcceptanceKind,
        /// the type of the automaton's acceptance condition
        found: AcceptanceKind,
    },
    /// A Rabin pipeline or a condition tagged as Rabin has a pair with more than one Inf index.
    #[error("Rabin pipeline needs a Rabin condition: {0}")]
    NotRabin(AcceptanceError),
}

/// Error that is raised when a custom pipeline is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The pass needs a generalized Rabin condition.
    #[error("{pass} cannot be applied to {kind} acceptance")]
    UnsupportedPass {
        /// the offending pass
        pass: Pass,
        /// the type of acceptance the pipeline was made for
        kind: AcceptanceKind,
    },
}

/// Error that is raised when parsing a [`MinimizationLevel`] fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown minimization level {0}, expected one of light, medium or all")]
pub struct ParseLevelError(String);

/// How much effort is spent on minimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MinimizationLevel {
    /// Only the cheap passes, each applied once.
    Light,
    /// Currently the same as [`MinimizationLevel::All`].
    Medium,
    /// All passes, some of them repeatedly.
    #[default]
    All,
}

impl FromStr for MinimizationLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(MinimizationLevel::Light),
            "medium" => Ok(MinimizationLevel::Medium),
            "all" => Ok(MinimizationLevel::All),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl Display for MinimizationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MinimizationLevel::Light => "light",
            MinimizationLevel::Medium => "medium",
            MinimizationLevel::All => "all",
        };
        write!(f, "{name}")
    }
}

/// Names a single minimization pass, see the functions in [`crate::minimization`] for what
/// each of them does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Pass {
    Overlap,
    RemoveTransientAcceptance,
    ComplementaryInf,
    GloballyIrrelevant,
    EdgeImplications,
    MergePairs,
    SccIrrelevant,
    Trivial,
    PairImplications,
    MergeBuchiTypePairs,
}

impl Pass {
    /// Returns true if the pass works for any type of acceptance condition.
    pub fn is_acceptance_agnostic(&self) -> bool {
        matches!(self, Pass::RemoveTransientAcceptance)
    }

    /// Returns true if the pass can be applied to an acceptance condition of type `kind`.
    pub fn supports(&self, kind: AcceptanceKind) -> bool {
        self.is_acceptance_agnostic()
            || matches!(kind, AcceptanceKind::Rabin | AcceptanceKind::GeneralizedRabin)
    }

    /// Applies the pass to an automaton with generalized Rabin acceptance.
    pub fn apply_generalized_rabin<S: State>(
        &self,
        automaton: &mut MutableAutomaton<S, GeneralizedRabinCondition>,
    ) {
        match self {
            Pass::Overlap => minimize_overlap(automaton),
            Pass::RemoveTransientAcceptance => remove_transient_acceptance(automaton),
            Pass::ComplementaryInf => minimize_complementary_inf(automaton),
            Pass::GloballyIrrelevant => minimize_globally_irrelevant(automaton),
            Pass::EdgeImplications => minimize_edge_implications(automaton),
            Pass::MergePairs => minimize_merge_pairs(automaton),
            Pass::SccIrrelevant => minimize_scc_irrelevant(automaton),
            Pass::Trivial => minimize_trivial(automaton),
            Pass::PairImplications => minimize_pair_implications(automaton),
            Pass::MergeBuchiTypePairs => merge_buchi_type_pairs(automaton),
        }
    }

    /// Applies an acceptance agnostic pass, other passes are skipped.
    pub fn apply<S: State, A: OmegaAcceptance>(&self, automaton: &mut MutableAutomaton<S, A>) {
        match self {
            Pass::RemoveTransientAcceptance => remove_transient_acceptance(automaton),
            pass => debug!(
                "skipping {pass}, it cannot be applied to {} acceptance",
                automaton.acceptance().name()
            ),
        }
    }
}

impl Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Pass::Overlap => "overlap",
            Pass::RemoveTransientAcceptance => "remove transient acceptance",
            Pass::ComplementaryInf => "complementary Inf",
            Pass::GloballyIrrelevant => "globally irrelevant",
            Pass::EdgeImplications => "edge implications",
            Pass::MergePairs => "merge pairs",
            Pass::SccIrrelevant => "SCC irrelevant",
            Pass::Trivial => "trivial",
            Pass::PairImplications => "pair implications",
            Pass::MergeBuchiTypePairs => "merge Büchi type pairs",
        };
        write!(f, "{name}")
    }
}

use Pass::*;

const RABIN: &[Pass] = &[
    Overlap,
    MergePairs,
    RemoveTransientAcceptance,
    GloballyIrrelevant,
    EdgeImplications,
    SccIrrelevant,
    Trivial,
    PairImplications,
    MergePairs,
    PairImplications,
    EdgeImplications,
    SccIrrelevant,
    MergeBuchiTypePairs,
];

const GENERALIZED_RABIN_LIGHT: &[Pass] = &[
    Overlap,
    RemoveTransientAcceptance,
    ComplementaryInf,
    GloballyIrrelevant,
    EdgeImplications,
    SccIrrelevant,
    Trivial,
];

const GENERALIZED_RABIN_ALL: &[Pass] = &[
    Overlap,
    MergePairs,
    RemoveTransientAcceptance,
    ComplementaryInf,
    GloballyIrrelevant,
    EdgeImplications,
    SccIrrelevant,
    Trivial,
    PairImplications,
    MergePairs,
    ComplementaryInf,
    PairImplications,
    EdgeImplications,
    SccIrrelevant,
    GloballyIrrelevant,
    MergeBuchiTypePairs,
];

const PARITY: &[Pass] = &[RemoveTransientAcceptance];

/// A fixed sequence of passes for one type of acceptance condition. The sequence is applied
/// once, in order, and unreachable states are trimmed after every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    kind: AcceptanceKind,
    passes: Vec<Pass>,
}

impl Pipeline {
    /// Gives the default pipeline for the given type of acceptance condition, or `None` if
    /// there is no minimization for it.
    pub fn new(kind: AcceptanceKind, level: MinimizationLevel) -> Option<Self> {
        let passes = match (kind, level) {
            (AcceptanceKind::Rabin, _) => RABIN,
            (AcceptanceKind::GeneralizedRabin, MinimizationLevel::Light) => {
                GENERALIZED_RABIN_LIGHT
            }
            (AcceptanceKind::GeneralizedRabin, _) => GENERALIZED_RABIN_ALL,
            (AcceptanceKind::Parity, _) => PARITY,
            (AcceptanceKind::Buchi | AcceptanceKind::CoBuchi, _) => return None,
        };
        Some(Self {
            kind,
            passes: passes.to_vec(),
        })
    }

    /// Builds a pipeline from the given passes, fails if one of them cannot be applied to
    /// acceptance conditions of type `kind`.
    pub fn custom<I: IntoIterator<Item = Pass>>(
        kind: AcceptanceKind,
        passes: I,
    ) -> Result<Self, PipelineError> {
        let passes: Vec<_> = passes.into_iter().collect();
        if let Some(&pass) = passes.iter().find(|pass| !pass.supports(kind)) {
            return Err(PipelineError::UnsupportedPass { pass, kind });
        }
        Ok(Self { kind, passes })
    }

    /// The type of acceptance condition this pipeline is made for.
    pub fn kind(&self) -> AcceptanceKind {
        self.kind
    }

    /// The passes in the order in which they are applied.
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Checks whether the pipeline can be applied to `acceptance`. A Rabin condition can be
    /// minimized with a generalized Rabin pipeline and a generalized Rabin condition with a Rabin
    /// pipeline. Whenever a Rabin condition is involved, every pair must have at most one Inf
    /// index.
    pub fn check(&self, acceptance: &AcceptanceCondition) -> Result<(), MinimizationError> {
        match (self.kind, acceptance) {
            (
                AcceptanceKind::Rabin | AcceptanceKind::GeneralizedRabin,
                AcceptanceCondition::Rabin(gra),
            )
            | (AcceptanceKind::Rabin, AcceptanceCondition::GeneralizedRabin(gra)) => {
                AcceptanceCondition::rabin(gra.clone())
                    .map(|_| ())
                    .map_err(MinimizationError::NotRabin)
            }
            (expected, acceptance) if expected == acceptance.kind() => Ok(()),
            (expected, acceptance) => Err(MinimizationError::AcceptanceMismatch {
                expected,
                found: acceptance.kind(),
            }),
        }
    }

    /// Runs all passes on `automaton`. The result carries a Rabin condition if either the
    /// pipeline or the input was Rabin, otherwise it has the same type of acceptance as the
    /// input.
    pub fn run<S: State>(
        &self,
        automaton: MutableAutomaton<S>,
    ) -> Result<MutableAutomaton<S>, MinimizationError> {
        self.check(automaton.acceptance())?;
        Ok(self.apply(automaton))
    }

    /// Runs the passes, assumes that [`Self::check`] succeeded.
    fn apply<S: State>(&self, automaton: MutableAutomaton<S>) -> MutableAutomaton<S> {
        let found = automaton.acceptance().kind();
        debug!(
            "minimizing {found} automaton with {} states and {} acceptance sets using {} passes",
            automaton.size(),
            automaton.acceptance().acceptance_sets(),
            self.passes.len()
        );

        let minimized = match self.kind {
            AcceptanceKind::Rabin | AcceptanceKind::GeneralizedRabin => {
                let rabin = self.kind == AcceptanceKind::Rabin || found == AcceptanceKind::Rabin;
                match automaton.try_map_acceptance(AcceptanceCondition::into_generalized_rabin) {
                    Ok(mut gra) => {
                        for pass in &self.passes {
                            run_pass(&mut gra, *pass, |automaton| {
                                pass.apply_generalized_rabin(automaton)
                            });
                        }
                        gra.map_acceptance(|acceptance| match rabin {
                            true => AcceptanceCondition::Rabin(acceptance),
                            false => AcceptanceCondition::GeneralizedRabin(acceptance),
                        })
                    }
                    Err(automaton) => {
                        debug!("{found} acceptance is not generalized Rabin, skipping");
                        automaton
                    }
                }
            }
            _ => {
                let mut automaton = automaton;
                for pass in &self.passes {
                    run_pass(&mut automaton, *pass, |automaton| pass.apply(automaton));
                }
                automaton
            }
        };

        debug!(
            "minimized automaton has {} states and {} acceptance sets",
            minimized.size(),
            minimized.acceptance().acceptance_sets()
        );
        minimized
    }
}

/// Applies a single pass followed by trimming, and checks in debug builds that the pass did not
/// break the automaton.
fn run_pass<S, A, F>(automaton: &mut MutableAutomaton<S, A>, pass: Pass, apply: F)
where
    S: State,
    A: OmegaAcceptance,
    F: FnOnce(&mut MutableAutomaton<S, A>),
{
    let sets = automaton.acceptance().acceptance_sets();
    trace!("applying {pass}");
    apply(automaton);
    automaton.trim();

    if cfg!(debug_assertions) {
        if !automaton.is_well_formed() {
            error!("{pass} left marks that the acceptance condition does not declare");
            panic!("{pass} produced a malformed automaton");
        }
        let after = automaton.acceptance().acceptance_sets();
        if after > sets {
            error!("{pass} increased the number of acceptance sets from {sets} to {after}");
            panic!("{pass} increased the number of acceptance sets");
        }
    }
    trace!("after {pass}:\n{automaton:?}");
}

/// Minimizes `automaton` with the default pipeline for its type of acceptance condition. Types
/// without a pipeline are returned unchanged.
pub fn minimize_default<S: State>(
    automaton: MutableAutomaton<S>,
    level: MinimizationLevel,
) -> MutableAutomaton<S> {
    let kind = automaton.acceptance().kind();
    let Some(pipeline) = Pipeline::new(kind, level) else {
        debug!("no minimization available for {kind} acceptance");
        return automaton;
    };
    if let Err(err) = pipeline.check(automaton.acceptance()) {
        debug!("skipping minimization: {err}");
        return automaton;
    }
    pipeline.apply(automaton)
}
