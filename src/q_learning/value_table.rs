//! Sparse value table for tabular Q-learning

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tictactoe::StateKey;

/// Step size and discount used by [`ValueTable::update`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdParams {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount: f64,
}

impl TdParams {
    pub fn new(learning_rate: f64, discount: f64) -> Self {
        Self {
            learning_rate,
            discount,
        }
    }
}

/// Value table mapping (state, action) pairs to value estimates
///
/// Entries that were never written read as `0.0` and are not stored, so
/// memory grows with the number of visited pairs rather than with the size
/// of the state space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    values: HashMap<(StateKey, usize), f64>,
}

impl ValueTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a state-action pair, `0.0` when unseen
    pub fn lookup(&self, state: &StateKey, action: usize) -> f64 {
        self.values.get(&(*state, action)).copied().unwrap_or(0.0)
    }

    /// Set the value of a state-action pair
    pub fn set(&mut self, state: StateKey, action: usize, value: f64) {
        self.values.insert((state, action), value);
    }

    /// Maximum value over `actions` in `state`, `0.0` for no actions
    pub fn max_value(&self, state: &StateKey, actions: &[usize]) -> f64 {
        if actions.is_empty() {
            return 0.0;
        }
        actions
            .iter()
            .map(|&action| self.lookup(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// One-step tabular update
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// The future term is zero when `next_legal_actions` is empty.
    pub fn update(
        &mut self,
        state: StateKey,
        action: usize,
        reward: f64,
        next_state: &StateKey,
        next_legal_actions: &[usize],
        params: TdParams,
    ) {
        let current = self.lookup(&state, action);
        let max_next = self.max_value(next_state, next_legal_actions);
        let target = reward + params.discount * max_next;
        let updated = current + params.learning_rate * (target - current);
        self.set(state, action, updated);
    }

    /// Values of `actions` in `state`, in the given order
    pub fn values_for(&self, state: &StateKey, actions: &[usize]) -> Vec<(usize, f64)> {
        actions
            .iter()
            .map(|&action| (action, self.lookup(state, action)))
            .collect()
    }

    /// Iterate over stored entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (StateKey, usize, f64)> + '_ {
        self.values
            .iter()
            .map(|(&(state, action), &value)| (state, action, value))
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
