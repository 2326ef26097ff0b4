//! Trained policy: the pair of per-role value tables produced by self-play

use super::{selector::ActionSelector, value_table::ValueTable};
use crate::{
    Error, Result,
    tictactoe::{GameEnvironment, Player, StateKey},
};

/// Value tables for both roles.
///
/// This is the read-only view handed to anything that plays with a trained
/// agent: moves are chosen greedily with the same tie-break the trainer uses,
/// never explored and never learned from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainedPolicy {
    x: ValueTable,
    o: ValueTable,
}

impl TrainedPolicy {
    pub fn new(x: ValueTable, o: ValueTable) -> Self {
        Self { x, o }
    }

    /// Table for a role
    pub fn table(&self, role: Player) -> &ValueTable {
        match role {
            Player::X => &self.x,
            Player::O => &self.o,
        }
    }

    pub(crate) fn table_mut(&mut self, role: Player) -> &mut ValueTable {
        match role {
            Player::X => &mut self.x,
            Player::O => &mut self.o,
        }
    }

    /// Value estimate of `action` in `state` for `role`
    pub fn lookup(&self, role: Player, state: &StateKey, action: usize) -> f64 {
        self.table(role).lookup(state, action)
    }

    /// Greedy action for `role` among `legal_actions`
    pub fn best_action(
        &self,
        role: Player,
        state: &StateKey,
        legal_actions: &[usize],
    ) -> Result<usize> {
        ActionSelector::greedy(self.table(role), state, legal_actions)
    }

    /// Greedy action for whoever is to move in `env`
    ///
    /// # Errors
    ///
    /// Returns [`Error::GameOver`] if the game has already ended.
    pub fn select_action(&self, env: &GameEnvironment) -> Result<usize> {
        if env.is_terminated() {
            return Err(Error::GameOver);
        }
        self.best_action(env.player_turn(), &env.state(), &env.available_actions())
    }

    /// Total number of stored entries across both tables
    pub fn len(&self) -> usize {
        self.x.len() + self.o.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.o.is_empty()
    }
}
