//! Step-based game environment shared by training and inference.
//!
//! The environment owns one mutable board and exposes the reset/step
//! vocabulary used by the trainer and by anything that plays against a
//! trained policy. Rewards are reported from the perspective of the player
//! who just moved: `1.0` when that move completed a line, `0.0` otherwise.

use super::{
    board::{BoardState, Player, StateKey},
    game::GameOutcome,
    lines::LineAnalyzer,
};
use crate::{Error, Result};

/// Result of a single environment step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Position after the move
    pub state: StateKey,
    /// Reward for the player who just moved
    pub reward: f64,
    /// Whether the move ended the game
    pub terminated: bool,
}

/// Tic-Tac-Toe state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEnvironment {
    board: BoardState,
    outcome: Option<GameOutcome>,
}

impl GameEnvironment {
    /// Create an environment on the empty board with X to move
    pub fn new() -> Self {
        Self {
            board: BoardState::new(),
            outcome: None,
        }
    }

    /// Create an environment positioned at an arbitrary legal board.
    ///
    /// Terminal boards are classified immediately, so a subsequent `step`
    /// is rejected with [`Error::GameOver`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnreachableBoard`] if the board is not reachable under
    /// the game rules.
    pub fn from_board(board: BoardState) -> Result<Self> {
        if !board.is_valid() {
            let count = board.piece_count();
            return Err(Error::UnreachableBoard {
                board: board.key().to_string(),
                x_count: count.x,
                o_count: count.o,
                to_move: board.to_move,
            });
        }
        Ok(Self {
            board,
            outcome: Self::classify(&board),
        })
    }

    fn classify(board: &BoardState) -> Option<GameOutcome> {
        if let Some(winner) = board.winner() {
            Some(GameOutcome::Win(winner))
        } else if board.is_draw() {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }

    /// Clear the board, give X the move and return the initial state key
    pub fn reset(&mut self) -> StateKey {
        self.board = BoardState::new();
        self.outcome = None;
        self.board.key()
    }

    /// Play `action` for the current player.
    ///
    /// # Errors
    ///
    /// - [`Error::GameOver`] if the game already ended
    /// - [`Error::InvalidPosition`] if `action` is not in `0..9`
    /// - [`Error::InvalidMove`] if the cell is occupied
    ///
    /// The board is left untouched on error.
    pub fn step(&mut self, action: usize) -> Result<Step> {
        if self.outcome.is_some() {
            return Err(Error::GameOver);
        }

        let mover = self.board.to_move;
        self.board = self.board.make_move(action)?;
        self.outcome = Self::classify(&self.board);

        let reward = match self.outcome {
            Some(GameOutcome::Win(winner)) if winner == mover => 1.0,
            _ => 0.0,
        };

        Ok(Step {
            state: self.board.key(),
            reward,
            terminated: self.outcome.is_some(),
        })
    }

    /// Empty cells of the current board in ascending order
    pub fn available_actions(&self) -> Vec<usize> {
        self.board.empty_positions()
    }

    /// Player whose move is next
    pub fn player_turn(&self) -> Player {
        self.board.to_move
    }

    /// Key of the current position
    pub fn state(&self) -> StateKey {
        self.board.key()
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn is_terminated(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Completed line of the winner, if the game was won
    pub fn winning_line(&self) -> Option<[usize; 3]> {
        match self.outcome {
            Some(GameOutcome::Win(winner)) => LineAnalyzer::winning_line(&self.board.cells, winner),
            _ => None,
        }
    }
}

impl Default for GameEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_returns_empty_key() {
        let mut env = GameEnvironment::new();
        env.step(4).unwrap();
        assert_eq!(env.reset(), StateKey::EMPTY);
        assert_eq!(env.player_turn(), Player::X);
        assert_eq!(env.available_actions(), (0..9).collect::<Vec<_>>());
        assert!(!env.is_terminated());
    }

    #[test]
    fn test_center_opening() {
        let mut env = GameEnvironment::new();
        env.reset();
        let step = env.step(4).unwrap();

        assert_eq!(step.state.to_string(), "....X....");
        assert_eq!(step.reward, 0.0);
        assert!(!step.terminated);
        assert_eq!(env.available_actions(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(env.player_turn(), Player::O);
    }

    #[test]
    fn test_occupied_cell_is_rejected_without_overwrite() {
        let mut env = GameEnvironment::new();
        env.step(0).unwrap();
        let before = env.clone();

        assert!(matches!(env.step(0), Err(Error::InvalidMove { position: 0 })));
        assert!(matches!(env.step(12), Err(Error::InvalidPosition { position: 12 })));
        assert_eq!(env, before);
    }

    #[test]
    fn test_winning_move_rewards_mover() {
        let mut env = GameEnvironment::new();
        for pos in [0, 3, 1, 4] {
            env.step(pos).unwrap();
        }
        let step = env.step(2).unwrap();

        assert!(step.terminated);
        assert_eq!(step.reward, 1.0);
        assert_eq!(env.outcome(), Some(GameOutcome::Win(Player::X)));
        assert_eq!(env.winning_line(), Some([0, 1, 2]));
        assert!(matches!(env.step(8), Err(Error::GameOver)));
    }

    #[test]
    fn test_o_win_rewards_o() {
        let mut env = GameEnvironment::new();
        for pos in [0, 1, 2, 4, 5] {
            env.step(pos).unwrap();
        }
        let step = env.step(7).unwrap();

        assert!(step.terminated);
        assert_eq!(step.reward, 1.0);
        assert_eq!(env.outcome(), Some(GameOutcome::Win(Player::O)));
    }

    #[test]
    fn test_draw_has_zero_reward() {
        let mut env = GameEnvironment::new();
        let moves = [0, 1, 2, 4, 3, 6, 5, 8];
        for pos in moves {
            let step = env.step(pos).unwrap();
            assert!(!step.terminated);
        }
        let step = env.step(7).unwrap();

        assert!(step.terminated);
        assert_eq!(step.reward, 0.0);
        assert_eq!(env.outcome(), Some(GameOutcome::Draw));
        assert!(env.available_actions().is_empty());
        assert_eq!(env.winning_line(), None);
    }

    #[test]
    fn test_from_board_rejects_unreachable_positions() {
        let board = BoardState {
            cells: *StateKey::parse("XXX......").unwrap().cells(),
            to_move: Player::O,
        };
        assert!(matches!(
            GameEnvironment::from_board(board),
            Err(Error::UnreachableBoard {
                x_count: 3,
                o_count: 0,
                to_move: Player::O,
                ..
            })
        ));

        // Counts are fine but the turn is wrong
        let board = BoardState {
            cells: *StateKey::parse("X........").unwrap().cells(),
            to_move: Player::X,
        };
        let err = GameEnvironment::from_board(board).unwrap_err();
        assert_eq!(
            err.to_string(),
            "board 'X........' is not reachable: X=1, O=0, X to move"
        );
    }
}
