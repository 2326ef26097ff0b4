//! Tic-Tac-Toe game implementation

pub mod board;
pub mod environment;
pub mod game;
pub mod lines;
pub mod validation;

pub use board::{BoardState, Cell, PieceCount, Player, StateKey};
pub use environment::{GameEnvironment, Step};
pub use game::{GameOutcome, Move};
pub use lines::{LineAnalyzer, WINNING_LINES};
pub use validation::reachable_states;
