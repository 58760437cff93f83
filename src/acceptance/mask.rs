use bit_set::BitSet;
use itertools::Itertools;

use crate::Show;

/// The set of acceptance indices that an edge is a member of. For an edge `e` and an index `i`,
/// `e` is in the acceptance set `i` if and only if the mask of `e` contains `i`.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct AcceptanceMask(BitSet);

impl AcceptanceMask {
    /// Creates an empty mask.
    pub fn new() -> Self {
        Self(BitSet::new())
    }

    /// Creates a mask that contains every index in `0..sets`.
    pub fn full(sets: usize) -> Self {
        (0..sets).collect()
    }

    /// Returns true if and only if `index` is contained in the mask.
    #[inline(always)]
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(index)
    }

    /// Adds `index` to the mask, returns true if it was not present before.
    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    /// Removes `index` from the mask, returns true if it was present before.
    pub fn remove(&mut self, index: usize) -> bool {
        self.0.remove(index)
    }

    /// Iterates over all contained indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter()
    }

    /// Returns the number of indices in the mask.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the mask contains no index at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the largest index in the mask, if there is any.
    pub fn max_index(&self) -> Option<usize> {
        self.iter().last()
    }

    /// Returns the smallest index in the mask, if there is any.
    pub fn min_index(&self) -> Option<usize> {
        self.iter().next()
    }

    /// Adds all indices of `other` to `self`.
    pub fn union_with(&mut self, other: &AcceptanceMask) {
        self.0.union_with(&other.0)
    }

    /// Removes all indices from `self` that are not in `other`.
    pub fn intersect_with(&mut self, other: &AcceptanceMask) {
        self.0.intersect_with(&other.0)
    }

    /// Removes all indices of `other` from `self`.
    pub fn difference_with(&mut self, other: &AcceptanceMask) {
        self.0.difference_with(&other.0)
    }

    /// Returns true if `self` and `other` have no index in common.
    pub fn is_disjoint(&self, other: &AcceptanceMask) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Only keeps the indices for which `f` returns true.
    pub fn retain<F: FnMut(usize) -> bool>(&mut self, mut f: F) {
        let removed = self.iter().filter(|&i| !f(i)).collect_vec();
        for index in removed {
            self.0.remove(index);
        }
    }

    /// Removes all indices.
    pub fn clear(&mut self) {
        self.0.clear()
    }
}

impl FromIterator<usize> for AcceptanceMask {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(BitSet::from_iter(iter))
    }
}

impl<const N: usize> From<[usize; N]> for AcceptanceMask {
    fn from(value: [usize; N]) -> Self {
        value.into_iter().collect()
    }
}

impl From<Vec<usize>> for AcceptanceMask {
    fn from(value: Vec<usize>) -> Self {
        value.into_iter().collect()
    }
}

impl Show for AcceptanceMask {
    fn show(&self) -> String {
        format!("{{{}}}", self.iter().join(", "))
    }
}

impl std::fmt::Debug for AcceptanceMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.show())
    }
}
