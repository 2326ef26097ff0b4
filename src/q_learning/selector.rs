//! ε-greedy action selection over a value table

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use super::value_table::ValueTable;
use crate::{Error, Result, tictactoe::StateKey};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// ε-greedy action selector
///
/// Owns the random source for exploration draws. With a seed, the sequence of
/// selections is fully reproducible.
#[derive(Debug, Clone)]
pub struct ActionSelector {
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl ActionSelector {
    /// Create a selector seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    /// Create a selector with a deterministic seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: build_rng(Some(seed)),
            rng_seed: Some(seed),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.rng_seed
    }

    /// Pick an action for `state`.
    ///
    /// With probability `epsilon` a uniformly random legal action is returned,
    /// otherwise the greedy one (see [`ActionSelector::greedy`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoValidMoves`] if `legal_actions` is empty.
    pub fn select(
        &mut self,
        table: &ValueTable,
        state: &StateKey,
        legal_actions: &[usize],
        epsilon: f64,
    ) -> Result<usize> {
        if legal_actions.is_empty() {
            return Err(Error::NoValidMoves);
        }

        if self.rng.random::<f64>() < epsilon {
            legal_actions
                .choose(&mut self.rng)
                .copied()
                .ok_or(Error::NoValidMoves)
        } else {
            Self::greedy(table, state, legal_actions)
        }
    }

    /// Highest-valued legal action; ties go to the earliest entry of
    /// `legal_actions`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoValidMoves`] if `legal_actions` is empty.
    pub fn greedy(table: &ValueTable, state: &StateKey, legal_actions: &[usize]) -> Result<usize> {
        let (&first, rest) = legal_actions.split_first().ok_or(Error::NoValidMoves)?;

        let mut best = (first, table.lookup(state, first));
        for &action in rest {
            let value = table.lookup(state, action);
            if value > best.1 {
                best = (action, value);
            }
        }

        Ok(best.0)
    }
}

impl Default for ActionSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greedy_picks_highest_value() {
        let mut table = ValueTable::new();
        table.set(StateKey::EMPTY, 0, 0.5);
        table.set(StateKey::EMPTY, 1, 1.5);
        table.set(StateKey::EMPTY, 2, 0.8);

        assert_eq!(ActionSelector::greedy(&table, &StateKey::EMPTY, &[0, 1, 2]).unwrap(), 1);
    }

    #[test]
    fn test_greedy_ties_go_to_first_occurrence() {
        let mut table = ValueTable::new();
        table.set(StateKey::EMPTY, 3, 0.7);
        table.set(StateKey::EMPTY, 6, 0.7);

        assert_eq!(ActionSelector::greedy(&table, &StateKey::EMPTY, &[3, 6]).unwrap(), 3);
        assert_eq!(ActionSelector::greedy(&table, &StateKey::EMPTY, &[6, 3]).unwrap(), 6);

        // Untouched table: every action is 0.0, so the first one wins
        let empty = ValueTable::new();
        assert_eq!(ActionSelector::greedy(&empty, &StateKey::EMPTY, &[5, 1, 7]).unwrap(), 5);
    }

    #[test]
    fn test_zero_epsilon_is_greedy() {
        let mut table = ValueTable::new();
        table.set(StateKey::EMPTY, 8, 0.1);
        let mut selector = ActionSelector::with_seed(3);

        for _ in 0..100 {
            let action = selector
                .select(&table, &StateKey::EMPTY, &[0, 4, 8], 0.0)
                .unwrap();
            assert_eq!(action, 8);
        }
    }

    #[test]
    fn test_full_epsilon_explores_all_actions() {
        let table = ValueTable::new();
        let mut selector = ActionSelector::with_seed(11);
        let legal = [1, 3, 5, 7];
        let mut seen = [false; 9];

        for _ in 0..200 {
            let action = selector.select(&table, &StateKey::EMPTY, &legal, 1.0).unwrap();
            assert!(legal.contains(&action));
            seen[action] = true;
        }

        assert!(legal.iter().all(|&a| seen[a]));
    }

    #[test]
    fn test_seeded_selectors_agree() {
        let table = ValueTable::new();
        let legal: Vec<usize> = (0..9).collect();
        let mut a = ActionSelector::with_seed(42);
        let mut b = ActionSelector::with_seed(42);

        for _ in 0..50 {
            assert_eq!(
                a.select(&table, &StateKey::EMPTY, &legal, 0.5).unwrap(),
                b.select(&table, &StateKey::EMPTY, &legal, 0.5).unwrap()
            );
        }
        assert_eq!(a.seed(), Some(42));
    }

    #[test]
    fn test_empty_legal_actions_is_an_error() {
        let table = ValueTable::new();
        let mut selector = ActionSelector::with_seed(0);
        assert!(matches!(
            selector.select(&table, &StateKey::EMPTY, &[], 0.5),
            Err(Error::NoValidMoves)
        ));
        assert!(matches!(
            ActionSelector::greedy(&table, &StateKey::EMPTY, &[]),
            Err(Error::NoValidMoves)
        ));
    }
}
