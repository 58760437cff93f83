use itertools::Itertools;

use crate::{math::Set, Show};

use super::{AcceptanceError, AcceptanceMask, OmegaAcceptance, RemoveIndices};

/// A generalized Rabin pair consists of an optional Fin index and an ordered list of Inf
/// indices. It accepts a run if the Fin index (if present) is seen only finitely often and
/// each of the Inf indices is seen infinitely often.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneralizedRabinPair {
    fin: Option<usize>,
    infs: Vec<usize>,
}

impl GeneralizedRabinPair {
    pub(crate) fn new(fin: Option<usize>, infs: Vec<usize>) -> Self {
        Self { fin, infs }
    }

    /// Gives the Fin index of the pair, if there is one.
    pub fn fin(&self) -> Option<usize> {
        self.fin
    }

    /// Gives the Inf indices of the pair in their order.
    pub fn infs(&self) -> &[usize] {
        &self.infs
    }

    /// Returns the number of Inf indices.
    pub fn inf_count(&self) -> usize {
        self.infs.len()
    }

    /// Returns true if the pair has a Fin index.
    pub fn has_fin(&self) -> bool {
        self.fin.is_some()
    }

    /// Returns true if the pair has at least one Inf index.
    pub fn has_inf(&self) -> bool {
        !self.infs.is_empty()
    }

    /// Returns true if the pair has neither a Fin nor an Inf index.
    pub fn is_empty(&self) -> bool {
        self.fin.is_none() && self.infs.is_empty()
    }

    /// Returns true if `index` is the Fin index of the pair.
    pub fn is_fin(&self, index: usize) -> bool {
        self.fin == Some(index)
    }

    /// Returns true if `index` is one of the Inf indices of the pair.
    pub fn is_inf(&self, index: usize) -> bool {
        self.infs.contains(&index)
    }

    /// Returns true if `index` is used by the pair at all.
    pub fn contains(&self, index: usize) -> bool {
        self.is_fin(index) || self.is_inf(index)
    }

    /// Checks whether the Fin index of the pair is in `mask`.
    pub fn contains_fin(&self, mask: &AcceptanceMask) -> bool {
        self.fin.is_some_and(|fin| mask.contains(fin))
    }

    /// Checks whether some Inf index of the pair is in `mask`.
    pub fn contains_inf(&self, mask: &AcceptanceMask) -> bool {
        self.infs.iter().any(|&inf| mask.contains(inf))
    }

    /// Checks whether the mask contains any index of the pair.
    pub fn contains_any(&self, mask: &AcceptanceMask) -> bool {
        self.contains_fin(mask) || self.contains_inf(mask)
    }

    /// Iterates over all indices of the pair, the Fin index comes first.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.fin.into_iter().chain(self.infs.iter().copied())
    }

    /// Decides whether the pair accepts a run that visits precisely the indices in
    /// `infinitely_often` infinitely often.
    pub fn accepts(&self, infinitely_often: &AcceptanceMask) -> bool {
        !self.contains_fin(infinitely_often)
            && self.infs.iter().all(|&inf| infinitely_often.contains(inf))
    }
}

impl Show for GeneralizedRabinPair {
    fn show(&self) -> String {
        let fin = self.fin.map(|fin| format!("Fin({fin})"));
        let infs = self.infs.iter().map(|inf| format!("Inf({inf})"));
        fin.into_iter().chain(infs).join(" & ")
    }
}

/// A generalized Rabin condition is a disjunction of [`GeneralizedRabinPair`]s. The pairs never
/// share an index and no pair is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralizedRabinCondition {
    pairs: Vec<GeneralizedRabinPair>,
    sets: usize,
}

impl GeneralizedRabinCondition {
    /// Creates a new condition from the given pairs using the indices `0..sets`. Fails if a
    /// pair uses an index out of that range, if an index is used twice or if a pair is empty.
    pub fn new(pairs: Vec<GeneralizedRabinPair>, sets: usize) -> Result<Self, AcceptanceError> {
        let mut seen = Set::default();
        for (number, pair) in pairs.iter().enumerate() {
            if pair.is_empty() {
                return Err(AcceptanceError::EmptyPair(number));
            }
            for index in pair.indices() {
                if index >= sets {
                    return Err(AcceptanceError::IndexOutOfRange { index, sets });
                }
                if !seen.insert(index) {
                    return Err(AcceptanceError::SharedIndex(index));
                }
            }
        }
        Ok(Self { pairs, sets })
    }

    /// Gives a builder that collects pairs one after another.
    pub fn builder() -> GeneralizedRabinBuilder {
        GeneralizedRabinBuilder::default()
    }

    /// Returns the pairs in their order.
    pub fn pairs(&self) -> &[GeneralizedRabinPair] {
        &self.pairs
    }

    /// Returns the number of pairs.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if every pair has at most one Inf index.
    pub fn is_rabin(&self) -> bool {
        self.pairs.iter().all(|pair| pair.inf_count() <= 1)
    }
}

impl OmegaAcceptance for GeneralizedRabinCondition {
    fn acceptance_sets(&self) -> usize {
        self.sets
    }

    fn name(&self) -> &'static str {
        "generalized-Rabin"
    }

    fn accepts(&self, infinitely_often: &AcceptanceMask) -> bool {
        self.pairs.iter().any(|pair| pair.accepts(infinitely_often))
    }
}

impl RemoveIndices for GeneralizedRabinCondition {
    /// Deletes every index for which `predicate` holds and renumbers the remaining ones
    /// contiguously, keeping their relative order. Pairs that lose all their indices are
    /// dropped from the condition.
    fn remove_indices<P: FnMut(usize) -> bool>(&mut self, mut predicate: P) {
        let mut remapping = Vec::with_capacity(self.sets);
        let mut next = 0;
        for index in 0..self.sets {
            if predicate(index) {
                remapping.push(None);
            } else {
                remapping.push(Some(next));
                next += 1;
            }
        }

        self.pairs = std::mem::take(&mut self.pairs)
            .into_iter()
            .filter_map(|pair| {
                let fin = pair.fin.and_then(|fin| remapping[fin]);
                let infs = pair.infs.iter().filter_map(|&inf| remapping[inf]).collect();
                let pair = GeneralizedRabinPair::new(fin, infs);
                (!pair.is_empty()).then_some(pair)
            })
            .collect();
        self.sets = next;
    }
}

impl Show for GeneralizedRabinCondition {
    fn show(&self) -> String {
        if self.pairs.is_empty() {
            return "f".to_string();
        }
        self.pairs
            .iter()
            .map(|pair| format!("({})", pair.show()))
            .join(" | ")
    }
}

/// Collects the pairs of a [`GeneralizedRabinCondition`].
#[derive(Debug, Clone, Default)]
pub struct GeneralizedRabinBuilder {
    pairs: Vec<GeneralizedRabinPair>,
    sets: Option<usize>,
}

impl GeneralizedRabinBuilder {
    /// Adds a pair with the given Fin index and Inf indices.
    pub fn pair<I: IntoIterator<Item = usize>>(mut self, fin: Option<usize>, infs: I) -> Self {
        self.pairs
            .push(GeneralizedRabinPair::new(fin, infs.into_iter().collect()));
        self
    }

    /// Fixes the number of acceptance sets. If this is not called, the number is one more than
    /// the largest index used by some pair.
    pub fn acceptance_sets(mut self, sets: usize) -> Self {
        self.sets = Some(sets);
        self
    }

    /// Validates the collected pairs and builds the condition.
    pub fn build(self) -> Result<GeneralizedRabinCondition, AcceptanceError> {
        let sets = self.sets.unwrap_or_else(|| {
            self.pairs
                .iter()
                .flat_map(|pair| pair.indices())
                .max()
                .map_or(0, |max| max + 1)
        });
        GeneralizedRabinCondition::new(self.pairs, sets)
    }
}
