use thiserror::Error;

use crate::Show;

mod mask;
pub use mask::AcceptanceMask;

mod generalized_rabin;
pub use generalized_rabin::{
    GeneralizedRabinBuilder, GeneralizedRabinCondition, GeneralizedRabinPair,
};

mod parity;
pub use parity::{ParityCondition, ParityKind};

/// Abstracts the types of errors that can occur when constructing an acceptance condition.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AcceptanceError {
    /// A pair refers to an index that is not in the range of declared acceptance sets.
    #[error("index {index} is out of range for {sets} acceptance sets")]
    IndexOutOfRange {
        /// the offending index
        index: usize,
        /// the number of declared acceptance sets
        sets: usize,
    },
    /// Two pairs (or one pair twice) refer to the same index.
    #[error("index {0} is used more than once")]
    SharedIndex(usize),
    /// The pair with the given number has neither a Fin nor an Inf index.
    #[error("pair {0} has neither a Fin nor an Inf index")]
    EmptyPair(usize),
    /// A Rabin condition was requested, but the given pair has more than one Inf index.
    #[error("pair {pair} has {infs} Inf indices, a Rabin pair can have at most one")]
    NotRabin {
        /// the number of the offending pair
        pair: usize,
        /// the number of Inf indices it has
        infs: usize,
    },
}

/// Common interface of all acceptance conditions that classify runs by the set of acceptance
/// indices they see infinitely often.
pub trait OmegaAcceptance: Clone + std::fmt::Debug {
    /// Returns the number of acceptance sets, all indices lie in `0..acceptance_sets()`.
    fn acceptance_sets(&self) -> usize;

    /// A short name of the type of condition, mainly used for logging.
    fn name(&self) -> &'static str;

    /// Decides whether a run that sees precisely the indices in `infinitely_often` infinitely
    /// often is accepting.
    fn accepts(&self, infinitely_often: &AcceptanceMask) -> bool;

    /// Returns true if every index in `mask` is in range.
    fn is_well_formed_mask(&self, mask: &AcceptanceMask) -> bool {
        mask.max_index().map_or(true, |max| max < self.acceptance_sets())
    }
}

/// Acceptance conditions from which individual indices can be deleted.
pub trait RemoveIndices: OmegaAcceptance {
    /// Deletes every index for which `predicate` holds and renumbers the remaining indices
    /// contiguously while preserving their relative order.
    fn remove_indices<P: FnMut(usize) -> bool>(&mut self, predicate: P);
}

/// The type of an [`AcceptanceCondition`] without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AcceptanceKind {
    Rabin,
    GeneralizedRabin,
    Parity,
    Buchi,
    CoBuchi,
}

impl std::fmt::Display for AcceptanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AcceptanceKind::Rabin => "Rabin",
            AcceptanceKind::GeneralizedRabin => "generalized-Rabin",
            AcceptanceKind::Parity => "parity",
            AcceptanceKind::Buchi => "Buchi",
            AcceptanceKind::CoBuchi => "co-Buchi",
        };
        write!(f, "{name}")
    }
}

/// Disambiguates between the different types of acceptance conditions an automaton can carry.
/// The minimization pipelines are chosen based on this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptanceCondition {
    /// A generalized Rabin condition where every pair has at most one Inf index.
    Rabin(GeneralizedRabinCondition),
    /// An arbitrary generalized Rabin condition.
    GeneralizedRabin(GeneralizedRabinCondition),
    /// A parity condition.
    Parity(ParityCondition),
    /// Büchi condition `Inf(0)`.
    Buchi,
    /// Co-Büchi condition `Fin(0)`.
    CoBuchi,
}

impl AcceptanceCondition {
    /// Wraps `condition` as a Rabin condition, fails if some pair has more than one Inf index.
    pub fn rabin(condition: GeneralizedRabinCondition) -> Result<Self, AcceptanceError> {
        if let Some((pair, p)) = condition
            .pairs()
            .iter()
            .enumerate()
            .find(|(_, p)| p.inf_count() > 1)
        {
            return Err(AcceptanceError::NotRabin {
                pair,
                infs: p.inf_count(),
            });
        }
        Ok(AcceptanceCondition::Rabin(condition))
    }

    /// Returns the type of the condition.
    pub fn kind(&self) -> AcceptanceKind {
        match self {
            AcceptanceCondition::Rabin(_) => AcceptanceKind::Rabin,
            AcceptanceCondition::GeneralizedRabin(_) => AcceptanceKind::GeneralizedRabin,
            AcceptanceCondition::Parity(_) => AcceptanceKind::Parity,
            AcceptanceCondition::Buchi => AcceptanceKind::Buchi,
            AcceptanceCondition::CoBuchi => AcceptanceKind::CoBuchi,
        }
    }

    /// Gives the underlying generalized Rabin condition for the (generalized) Rabin variants.
    pub fn as_generalized_rabin(&self) -> Option<&GeneralizedRabinCondition> {
        match self {
            AcceptanceCondition::Rabin(gra) | AcceptanceCondition::GeneralizedRabin(gra) => {
                Some(gra)
            }
            _ => None,
        }
    }

    /// Unwraps the underlying generalized Rabin condition, hands `self` back for all other
    /// variants.
    pub fn into_generalized_rabin(self) -> Result<GeneralizedRabinCondition, Self> {
        match self {
            AcceptanceCondition::Rabin(gra) | AcceptanceCondition::GeneralizedRabin(gra) => {
                Ok(gra)
            }
            other => Err(other),
        }
    }
}

impl OmegaAcceptance for AcceptanceCondition {
    fn acceptance_sets(&self) -> usize {
        match self {
            AcceptanceCondition::Rabin(gra) | AcceptanceCondition::GeneralizedRabin(gra) => {
                gra.acceptance_sets()
            }
            AcceptanceCondition::Parity(parity) => parity.acceptance_sets(),
            AcceptanceCondition::Buchi | AcceptanceCondition::CoBuchi => 1,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AcceptanceCondition::Rabin(_) => "Rabin",
            AcceptanceCondition::GeneralizedRabin(gra) => gra.name(),
            AcceptanceCondition::Parity(parity) => parity.name(),
            AcceptanceCondition::Buchi => "Buchi",
            AcceptanceCondition::CoBuchi => "co-Buchi",
        }
    }

    fn accepts(&self, infinitely_often: &AcceptanceMask) -> bool {
        match self {
            AcceptanceCondition::Rabin(gra) | AcceptanceCondition::GeneralizedRabin(gra) => {
                gra.accepts(infinitely_often)
            }
            AcceptanceCondition::Parity(parity) => parity.accepts(infinitely_often),
            AcceptanceCondition::Buchi => infinitely_often.contains(0),
            AcceptanceCondition::CoBuchi => !infinitely_often.contains(0),
        }
    }
}

impl Show for AcceptanceCondition {
    fn show(&self) -> String {
        match self {
            AcceptanceCondition::Rabin(gra) | AcceptanceCondition::GeneralizedRabin(gra) => {
                format!("{}: {}", self.name(), gra.show())
            }
            AcceptanceCondition::Parity(parity) => parity.show(),
            AcceptanceCondition::Buchi => "Buchi: Inf(0)".to_string(),
            AcceptanceCondition::CoBuchi => "co-Buchi: Fin(0)".to_string(),
        }
    }
}
