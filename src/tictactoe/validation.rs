//! Board state validation logic

use std::collections::HashSet;

use super::board::{BoardState, Player};

impl BoardState {
    /// Check if the board state is reachable under X-first alternation
    pub fn is_valid(&self) -> bool {
        let count = self.piece_count();

        if !(count.x == count.o || count.x == count.o + 1) {
            return false;
        }

        // The recorded turn must match the piece counts
        let expected_turn = if count.x == count.o {
            Player::X
        } else {
            Player::O
        };
        if self.to_move != expected_turn {
            return false;
        }

        let x_wins = self.has_won(Player::X);
        let o_wins = self.has_won(Player::O);

        if x_wins && o_wins {
            return false;
        }

        // The winner must have made the last move
        if x_wins && count.x != count.o + 1 {
            return false;
        }
        if o_wins && count.x != count.o {
            return false;
        }

        true
    }
}

/// Enumerate every position reachable from the empty board by legal play.
///
/// Terminal positions are included but not expanded.
pub fn reachable_states() -> HashSet<BoardState> {
    let mut seen = HashSet::new();
    let mut stack = vec![BoardState::new()];

    while let Some(state) = stack.pop() {
        if !seen.insert(state) {
            continue;
        }
        for pos in state.legal_moves() {
            if let Ok(next) = state.make_move(pos) {
                stack.push(next);
            }
        }
    }

    seen
}
