//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Mark written into a cell by one of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Mark {
    /// Player 1 (the server, always moves first).
    #[display("X")]
    X,
    /// Player 2 (the client).
    #[display("O")]
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Byte used for this mark in board snapshots.
    pub fn to_byte(self) -> u8 {
        match self {
            Mark::X => b'X',
            Mark::O => b'O',
        }
    }

    /// Parses a snapshot byte back into a mark.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'X' => Some(Mark::X),
            b'O' => Some(Mark::O),
            _ => None,
        }
    }

    /// Player number used in human-readable results (1 or 2).
    pub fn player_number(self) -> u8 {
        match self {
            Mark::X => 1,
            Mark::O => 2,
        }
    }
}

/// A square on the tic-tac-toe board.
///
/// An empty square still carries its label implicitly: the label of a cell
/// is its own position number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Square still holding its label.
    Empty,
    /// Square occupied by a mark.
    Occupied(Mark),
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order.
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Builds a board from squares in row-major order.
    pub fn from_squares(squares: [Square; 9]) -> Self {
        Self { squares }
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Sets the square at the given position.
    pub fn set(&mut self, pos: Position, square: Square) {
        self.squares[pos.to_index()] = square;
    }

    /// Checks if a square still holds its label.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Number of cells holding the given mark.
    pub fn count(&self, mark: Mark) -> usize {
        self.squares
            .iter()
            .filter(|s| **s == Square::Occupied(mark))
            .count()
    }

    /// Formats the board as a human-readable string.
    ///
    /// Empty cells show their position number.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => (pos + 1).to_string(),
                    Square::Occupied(mark) => mark.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Current status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended in a win.
    Won(Mark),
    /// Game ended in a draw.
    Draw,
}

impl GameStatus {
    /// Whether the game has been decided.
    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Won(mark) => write!(f, "Player {} ({}) wins", mark.player_number(), mark),
            GameStatus::Draw => write!(f, "draw"),
        }
    }
}
