use tracing::debug;

use crate::{
    acceptance::{AcceptanceMask, GeneralizedRabinCondition, GeneralizedRabinPair},
    automaton::{Edge, MutableAutomaton},
};

/// Parameters for [`random_generalized_rabin`].
#[derive(Debug, Clone, PartialEq)]
pub struct RandomAutomatonConfig {
    /// Number of states, state `0` is the only initial state.
    pub states: usize,
    /// Number of outgoing edges of every state.
    pub out_degree: usize,
    /// Number of pairs of the acceptance condition.
    pub pairs: usize,
    /// Upper bound on the number of Inf indices of a pair.
    pub max_infs: usize,
    /// Probability with which a pair gets a Fin index.
    pub fin_probability: f64,
    /// Probability with which an edge is marked with a given index.
    pub mark_probability: f64,
    /// Seed of the random number generator, equal seeds give equal automata.
    pub seed: u64,
}

impl Default for RandomAutomatonConfig {
    fn default() -> Self {
        Self {
            states: 6,
            out_degree: 2,
            pairs: 3,
            max_infs: 2,
            fin_probability: 0.7,
            mark_probability: 0.3,
            seed: 0,
        }
    }
}

/// Draws a random automaton with generalized Rabin acceptance. Every state has
/// `config.out_degree` edges to uniformly chosen successors and every edge is marked with each
/// acceptance index independently with probability `config.mark_probability`. The pairs use
/// consecutive indices, a pair without Fin index always gets at least one Inf index.
///
/// States that are not reachable from `0` are kept, so the result may have to be trimmed.
pub fn random_generalized_rabin(
    config: &RandomAutomatonConfig,
) -> MutableAutomaton<usize, GeneralizedRabinCondition> {
    let mut rng = fastrand::Rng::with_seed(config.seed);

    let mut pairs = Vec::with_capacity(config.pairs);
    let mut sets = 0;
    for _ in 0..config.pairs {
        let fin = (rng.f64() < config.fin_probability).then(|| {
            sets += 1;
            sets - 1
        });
        let minimum = usize::from(fin.is_none());
        let infs = rng.usize(minimum..=config.max_infs.max(minimum));
        pairs.push(GeneralizedRabinPair::new(fin, (sets..sets + infs).collect()));
        sets += infs;
    }
    let acceptance = GeneralizedRabinCondition::new(pairs, sets)
        .expect("pairs use disjoint indices and are never empty");

    let mut automaton = MutableAutomaton::new(acceptance);
    for q in 0..config.states {
        automaton.add_state(q);
    }
    if config.states > 0 {
        automaton.add_initial_state(0);
    }
    for q in 0..config.states {
        for _ in 0..config.out_degree {
            let successor = rng.usize(..config.states);
            let colors: AcceptanceMask = (0..sets)
                .filter(|_| rng.f64() < config.mark_probability)
                .collect();
            automaton
                .add_edge(&q, Edge::new(successor, colors))
                .expect("both endpoints have been added");
        }
    }

    debug!(
        "drew random automaton with {} states and {} acceptance sets from seed {}",
        config.states, sets, config.seed
    );
    automaton
}

#[cfg(test)]
mod tests {
    use super::{random_generalized_rabin, RandomAutomatonConfig};
    use crate::acceptance::OmegaAcceptance;

    #[test]
    fn equal_seeds_give_equal_automata() {
        let config = RandomAutomatonConfig {
            seed: 17,
            ..Default::default()
        };
        let first = random_generalized_rabin(&config);
        let second = random_generalized_rabin(&config);
        assert_eq!(first.acceptance(), second.acceptance());
        assert_eq!(
            first.transitions().collect::<Vec<_>>(),
            second.transitions().collect::<Vec<_>>()
        );
        assert!(first.is_well_formed());
        assert_eq!(first.edge_count(), 12);
        assert!(first
            .acceptance()
            .pairs()
            .iter()
            .all(|pair| !pair.is_empty()));
        assert!(first.acceptance().acceptance_sets() <= 9);
    }
}
