//! Board positions and their wire digits.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::types::Board;

/// A position on the tic-tac-toe board.
///
/// Positions are numbered 1-9 in row-major order. The number doubles as
/// the cell's label while the cell is empty, and its ASCII digit is what
/// travels in a Move message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Position {
    /// Top-left (position 1)
    TopLeft,
    /// Top-center (position 2)
    TopCenter,
    /// Top-right (position 3)
    TopRight,
    /// Middle-left (position 4)
    MiddleLeft,
    /// Center (position 5)
    Center,
    /// Middle-right (position 6)
    MiddleRight,
    /// Bottom-left (position 7)
    BottomLeft,
    /// Bottom-center (position 8)
    BottomCenter,
    /// Bottom-right (position 9)
    BottomRight,
}

impl Position {
    /// All 9 positions in ascending order.
    ///
    /// The search enumerates moves in this order, which is what makes its
    /// tie-breaking deterministic.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Get label for this position (for display).
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Converts position to board index (0-8).
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Creates position from board index (0-8).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position number as shown to players (1-9).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Creates position from its number (1-9).
    pub fn from_number(number: u8) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|index| Self::from_index(usize::from(index)))
    }

    /// ASCII digit carried in Move messages ('1'-'9').
    pub fn to_digit(self) -> u8 {
        b'0' + self.number()
    }

    /// Parses a Move message's data byte.
    pub fn from_digit(digit: u8) -> Option<Self> {
        digit.checked_sub(b'0').and_then(Self::from_number)
    }

    /// Parses player input such as `"5"` (surrounding whitespace ignored).
    #[instrument]
    pub fn parse_input(s: &str) -> Option<Self> {
        s.trim().parse::<u8>().ok().and_then(Self::from_number)
    }

    /// Filters positions by board state - returns only empty squares.
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        Self::ALL
            .iter()
            .copied()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}
