use super::{AcceptanceMask, OmegaAcceptance};
use crate::Show;

/// Disambiguates between different types of parity conditions. These differ only
/// in the way that they decide acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ParityKind {
    MinEven,
    MinOdd,
    MaxEven,
    MaxOdd,
}

/// A parity condition over the priorities `0..priorities`. It classifies a run based on the
/// least (or greatest) priority that occurs infinitely often.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParityCondition {
    kind: ParityKind,
    priorities: usize,
}

impl ParityCondition {
    /// Creates a parity condition of the given kind over `priorities` many priorities.
    pub fn new(kind: ParityKind, priorities: usize) -> Self {
        Self { kind, priorities }
    }

    /// Returns the kind of parity condition.
    pub fn kind(&self) -> ParityKind {
        self.kind
    }

    /// Returns true if `priority` is accepting. May be called with the virtual priorities
    /// `-1` and `priorities`.
    fn is_accepting(&self, priority: i64) -> bool {
        let even = priority.rem_euclid(2) == 0;
        match self.kind {
            ParityKind::MinEven | ParityKind::MaxEven => even,
            ParityKind::MinOdd | ParityKind::MaxOdd => !even,
        }
    }
}

impl OmegaAcceptance for ParityCondition {
    fn acceptance_sets(&self) -> usize {
        self.priorities
    }

    fn name(&self) -> &'static str {
        "parity"
    }

    fn accepts(&self, infinitely_often: &AcceptanceMask) -> bool {
        // a run without priorities behaves like it sees the priority just outside the range
        let decisive = match self.kind {
            ParityKind::MinEven | ParityKind::MinOdd => infinitely_often
                .min_index()
                .map_or(self.priorities as i64, |p| p as i64),
            ParityKind::MaxEven | ParityKind::MaxOdd => {
                infinitely_often.max_index().map_or(-1, |p| p as i64)
            }
        };
        self.is_accepting(decisive)
    }
}

impl Show for ParityCondition {
    fn show(&self) -> String {
        let (order, parity) = match self.kind {
            ParityKind::MinEven => ("min", "even"),
            ParityKind::MinOdd => ("min", "odd"),
            ParityKind::MaxEven => ("max", "even"),
            ParityKind::MaxOdd => ("max", "odd"),
        };
        format!("parity {order} {parity} {}", self.priorities)
    }
}
