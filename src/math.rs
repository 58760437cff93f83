use std::collections::{BTreeMap, BTreeSet};

/// The hasher that backs [`Set`] and [`Map`].
pub type BuildHasher = fxhash::FxBuildHasher;

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
/// Iteration follows insertion order.
pub type Set<S> = indexmap::IndexSet<S, BuildHasher>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
/// Iteration follows insertion order.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;

/// Type alias for sets whose elements are iterated in ascending order.
pub type OrderedSet<S> = BTreeSet<S>;
/// Type alias for maps whose keys are iterated in ascending order.
pub type OrderedMap<K, V> = BTreeMap<K, V>;

#[cfg(test)]
mod tests {
    use super::{Map, Set};

    #[test]
    fn insertion_order_is_preserved() {
        let set: Set<_> = [5usize, 1, 3].into_iter().collect();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![5, 1, 3]);

        let mut map = Map::default();
        map.insert('b', 0);
        map.insert('a', 1);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!['b', 'a']);
    }
}
