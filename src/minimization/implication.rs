use owo_colors::OwoColorize;

use crate::{
    acceptance::{AcceptanceMask, GeneralizedRabinPair},
    automaton::Edge,
    Show,
};

/// Records which acceptance indices imply which other indices on a set of edges. An index `i`
/// implies an index `j` if every edge that is marked with `i` is also marked with `j`. Indices
/// that occur on no edge vacuously imply every index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicationMatrix {
    implies: Vec<AcceptanceMask>,
}

impl ImplicationMatrix {
    /// Computes the matrix over the indices `0..sets` from the given edges.
    pub fn from_edges<'a, S: 'a, I>(sets: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = &'a Edge<S>>,
    {
        let mut implies = vec![AcceptanceMask::full(sets); sets];
        for edge in edges {
            for index in edge.colors().iter() {
                if let Some(consequences) = implies.get_mut(index) {
                    consequences.intersect_with(edge.colors());
                }
            }
        }
        Self { implies }
    }

    /// Returns the number of indices the matrix ranges over.
    pub fn sets(&self) -> usize {
        self.implies.len()
    }

    /// Returns true if `antecedent` implies `consequent`.
    pub fn implies(&self, antecedent: usize, consequent: usize) -> bool {
        self.implies
            .get(antecedent)
            .is_some_and(|consequences| consequences.contains(consequent))
    }

    /// Gives all indices that are implied by `index`, which includes `index` itself.
    pub fn consequences(&self, index: usize) -> &AcceptanceMask {
        &self.implies[index]
    }

    /// Decides whether acceptance by `antecedent` entails acceptance by `consequent` on the
    /// edges the matrix was built from. The Fin index of `consequent` must imply the one of
    /// `antecedent` and every Inf index of `consequent` must be implied by an Inf index of
    /// `antecedent`. A pair without Inf indices is only implied by pairs without Inf indices.
    pub fn pair_implies(
        &self,
        antecedent: &GeneralizedRabinPair,
        consequent: &GeneralizedRabinPair,
    ) -> bool {
        if let Some(fin) = consequent.fin() {
            match antecedent.fin() {
                Some(antecedent_fin) if self.implies(fin, antecedent_fin) => {}
                _ => return false,
            }
        }

        if !consequent.has_inf() {
            return !antecedent.has_inf();
        }
        consequent.infs().iter().all(|&consequent_inf| {
            antecedent
                .infs()
                .iter()
                .any(|&antecedent_inf| self.implies(antecedent_inf, consequent_inf))
        })
    }
}

impl Show for ImplicationMatrix {
    fn show(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("=>".to_string()).chain((0..self.sets()).map(|j| j.to_string())),
        );
        for (i, consequences) in self.implies.iter().enumerate() {
            let mut row = vec![i.bold().to_string()];
            row.extend((0..self.sets()).map(|j| {
                if i == j {
                    "".to_string()
                } else if consequences.contains(j) {
                    "+".green().to_string()
                } else {
                    "-".dimmed().to_string()
                }
            }));
            builder.push_record(row);
        }
        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}
