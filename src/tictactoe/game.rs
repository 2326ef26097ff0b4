//! Game records and outcomes

use serde::{Deserialize, Serialize};

use super::board::Player;

/// A move in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub position: usize,
    pub player: Player,
}

/// Outcome of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    /// Terminal reward seen by `role`: +1 for a win, -1 for a loss, 0 for a draw.
    pub fn reward_for(self, role: Player) -> f64 {
        match self {
            GameOutcome::Win(winner) if winner == role => 1.0,
            GameOutcome::Win(_) => -1.0,
            GameOutcome::Draw => 0.0,
        }
    }

    pub fn is_draw(self) -> bool {
        matches!(self, GameOutcome::Draw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewards_are_mirrored() {
        let outcome = GameOutcome::Win(Player::O);
        assert_eq!(outcome.reward_for(Player::O), 1.0);
        assert_eq!(outcome.reward_for(Player::X), -1.0);

        assert_eq!(GameOutcome::Draw.reward_for(Player::X), 0.0);
        assert_eq!(GameOutcome::Draw.reward_for(Player::O), 0.0);
        assert!(GameOutcome::Draw.is_draw());
    }
}
