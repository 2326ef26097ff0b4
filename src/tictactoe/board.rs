//! Board state representation and basic operations

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '_' | '-' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' => Some(Cell::O),
            _ => None,
        }
    }
}

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell().to_char())
    }
}

/// Immutable key identifying a board position in a value table.
///
/// Holds the nine cells in row-major order and nothing else: the player to
/// move is implied by the piece counts for every reachable position, and no
/// symmetry reduction is applied. The text form is nine characters drawn from
/// `.XO`, e.g. `X...O....`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey([Cell; 9]);

impl StateKey {
    /// Key of the empty board
    pub const EMPTY: StateKey = StateKey([Cell::Empty; 9]);

    pub fn new(cells: [Cell; 9]) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[Cell; 9] {
        &self.0
    }

    /// Encode as the nine-character label
    pub fn encode(&self) -> String {
        self.0.iter().map(|&c| c.to_char()).collect()
    }

    /// Parse a nine-character label (whitespace is ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if the label does not have exactly 9 cells or any
    /// character is not a valid cell.
    pub fn parse(label: &str) -> Result<Self, crate::Error> {
        let chars: Vec<char> = label.chars().filter(|c| !c.is_whitespace()).collect();
        BoardState::parse_cells(&chars, label).map(Self)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for StateKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Complete board state including cells and whose turn it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
    pub to_move: Player,
}

/// Count of each piece type on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceCount {
    pub x: usize,
    pub o: usize,
    pub empty: usize,
}

impl BoardState {
    /// Create a new empty board with X to move
    pub fn new() -> Self {
        BoardState {
            cells: [Cell::Empty; 9],
            to_move: Player::X,
        }
    }

    /// Helper: Parse exactly 9 cells from a slice of characters.
    fn parse_cells(chars: &[char], context: &str) -> Result<[Cell; 9], crate::Error> {
        if chars.len() != 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: chars.len(),
                context: context.to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: context.to_string(),
            })?;
        }

        Ok(cells)
    }

    /// Count pieces on the board.
    pub fn piece_count(&self) -> PieceCount {
        let mut count = PieceCount {
            x: 0,
            o: 0,
            empty: 0,
        };
        for cell in &self.cells {
            match cell {
                Cell::X => count.x += 1,
                Cell::O => count.o += 1,
                Cell::Empty => count.empty += 1,
            }
        }
        count
    }

    fn determine_turn_from_counts(count: &PieceCount) -> Result<Player, crate::Error> {
        if count.x == count.o {
            Ok(Player::X)
        } else if count.x == count.o + 1 {
            Ok(Player::O)
        } else {
            Err(crate::Error::InvalidPieceCounts {
                x_count: count.x,
                o_count: count.o,
            })
        }
    }

    /// Build a board from its cells, inferring the player to move.
    ///
    /// # Errors
    ///
    /// Returns an error if X is not level with O or exactly one piece ahead.
    pub fn from_cells(cells: [Cell; 9]) -> Result<Self, crate::Error> {
        let mut board = BoardState {
            cells,
            to_move: Player::X,
        };
        board.to_move = Self::determine_turn_from_counts(&board.piece_count())?;
        Ok(board)
    }

    /// Create a board from a string representation.
    ///
    /// The string must contain 9 cell characters (whitespace is filtered out).
    /// The player to move is inferred from the piece counts with X moving
    /// first.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The string does not have exactly 9 non-whitespace characters
    /// - Any character is not a valid cell representation
    /// - The piece counts are impossible under X-first alternation
    pub fn from_string(s: &str) -> Result<Self, crate::Error> {
        Self::from_cells(*StateKey::parse(s)?.cells())
    }

    /// Value-table key for this position
    pub fn key(&self) -> StateKey {
        StateKey::new(self.cells)
    }

    /// Count the number of occupied cells on the board.
    pub fn occupied_count(&self) -> usize {
        let count = self.piece_count();
        count.x + count.o
    }

    /// Check if a position is empty
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// Get all empty positions in ascending order
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Make a move and return a new board state
    #[must_use = "make_move returns a new board state; the original is unchanged"]
    pub fn make_move(&self, pos: usize) -> Result<BoardState, crate::Error> {
        if pos >= 9 {
            return Err(crate::Error::InvalidPosition { position: pos });
        }

        if !self.is_empty(pos) {
            return Err(crate::Error::InvalidMove { position: pos });
        }

        let mut new_state = *self;
        new_state.cells[pos] = self.to_move.to_cell();
        new_state.to_move = self.to_move.opponent();
        Ok(new_state)
    }

    /// Get legal moves in this position (empty cells when game not terminal)
    pub fn legal_moves(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.empty_positions()
    }

    /// Check if a player has won
    pub fn has_won(&self, player: Player) -> bool {
        super::lines::LineAnalyzer::has_won(&self.cells, player)
    }

    /// Check if the game is over (win or draw)
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || !self.cells.contains(&Cell::Empty)
    }

    /// Check if the position is a draw (all cells filled, no winner)
    pub fn is_draw(&self) -> bool {
        !self.cells.contains(&Cell::Empty) && self.winner().is_none()
    }

    /// Get the winner if there is one
    pub fn winner(&self) -> Option<Player> {
        if self.has_won(Player::X) {
            Some(Player::X)
        } else if self.has_won(Player::O) {
            Some(Player::O)
        } else {
            None
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1).is_multiple_of(3) && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board() {
        let board = BoardState::new();
        assert_eq!(board.to_move, Player::X);
        for i in 0..9 {
            assert_eq!(board.cells[i], Cell::Empty);
        }
        assert_eq!(board.key(), StateKey::EMPTY);
    }

    #[test]
    fn test_make_move() {
        let board = BoardState::new();

        let new_board = board.make_move(4).unwrap();
        assert_eq!(new_board.cells[4], Cell::X);
        assert_eq!(new_board.to_move, Player::O);

        // Move on occupied cell
        let result = new_board.make_move(4);
        assert!(result.unwrap_err().to_string().contains("occupied"));

        // Off the board
        assert!(matches!(
            new_board.make_move(9),
            Err(crate::Error::InvalidPosition { position: 9 })
        ));
    }

    #[test]
    fn test_legal_moves() {
        let mut board = BoardState::new();
        assert_eq!(board.legal_moves().len(), 9);

        board = board.make_move(0).unwrap();
        assert_eq!(board.legal_moves(), vec![1, 2, 3, 4, 5, 6, 7, 8]);

        board = board.make_move(4).unwrap();
        assert_eq!(board.legal_moves().len(), 7);
        assert!(!board.legal_moves().contains(&4));
    }

    #[test]
    fn test_win_detection_vertical() {
        let mut board = BoardState::new();
        // O wins on middle column (1, 4, 7)
        board = board.make_move(0).unwrap(); // X
        board = board.make_move(1).unwrap(); // O
        board = board.make_move(2).unwrap(); // X
        board = board.make_move(4).unwrap(); // O
        board = board.make_move(5).unwrap(); // X
        board = board.make_move(7).unwrap(); // O

        assert!(board.is_terminal());
        assert_eq!(board.winner(), Some(Player::O));
        assert!(board.legal_moves().is_empty());
        assert!(!board.empty_positions().is_empty());
    }

    #[test]
    fn test_draw_detection() {
        let mut board = BoardState::new();
        for pos in [0, 1, 2, 4, 3, 6, 5, 8, 7] {
            board = board.make_move(pos).unwrap();
        }

        assert!(board.is_terminal());
        assert!(board.is_draw());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_from_string() {
        let board = BoardState::from_string("XOX......").unwrap();
        assert_eq!(board.cells[0], Cell::X);
        assert_eq!(board.cells[1], Cell::O);
        assert_eq!(board.cells[2], Cell::X);
        assert_eq!(board.to_move, Player::O);

        let spaced = BoardState::from_string("XO. ... ...").unwrap();
        assert_eq!(spaced.to_move, Player::X);

        assert!(matches!(
            BoardState::from_string("XO"),
            Err(crate::Error::InvalidBoardLength { got: 2, .. })
        ));
        assert!(matches!(
            BoardState::from_string("XX......."),
            Err(crate::Error::InvalidPieceCounts { .. })
        ));
        assert!(matches!(
            BoardState::from_string("O........"),
            Err(crate::Error::InvalidPieceCounts { .. })
        ));
    }

    #[test]
    fn test_state_key_text_form() {
        let key: StateKey = "X...O....".parse().unwrap();
        assert_eq!(key.cells()[0], Cell::X);
        assert_eq!(key.cells()[4], Cell::O);
        assert_eq!(key.to_string(), "X...O....");

        assert!(matches!(
            StateKey::parse("X...Q...."),
            Err(crate::Error::InvalidCellCharacter {
                character: 'Q',
                position: 4,
                ..
            })
        ));
        assert!(StateKey::parse("X...O.....").is_err());
    }

    #[test]
    fn test_key_ignores_turn() {
        let board = BoardState::from_string("X........").unwrap();
        let mut other = board;
        other.to_move = Player::X;
        assert_eq!(board.key(), other.key());
    }

    #[test]
    fn test_display_grid() {
        let board = BoardState::from_string("XO..X...O").unwrap();
        assert_eq!(board.to_string(), "XO.\n.X.\n..O");
    }
}
