//! First-class move type for tic-tac-toe.
//!
//! Moves are validated against a board before they are applied, so both
//! ends of a session can reject an illegal move without touching state.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::position::Position;
use crate::rules;
use crate::types::{Board, Mark, Square};

/// A mark placed at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The mark being placed.
    pub mark: Mark,
    /// The position where the mark goes.
    pub position: Position,
}

impl Move {
    /// Creates a new move.
    pub fn new(mark: Mark, position: Position) -> Self {
        Self { mark, position }
    }

    /// Builds a move from the ASCII digit carried on the wire.
    pub fn from_digit(mark: Mark, digit: u8) -> Result<Self, MoveError> {
        let position = Position::from_digit(digit).ok_or(MoveError::InvalidDigit(digit))?;
        Ok(Self::new(mark, position))
    }

    /// Checks the move against a board without applying it.
    ///
    /// The game must still be undecided and the target cell must still hold
    /// its label.
    #[instrument(skip(board), fields(mark = %self.mark, position = self.position.number()))]
    pub fn validate(&self, board: &Board) -> Result<(), MoveError> {
        if rules::evaluate(board).is_over() {
            return Err(MoveError::GameOver);
        }
        if !board.is_empty(self.position) {
            return Err(MoveError::SquareOccupied(self.position));
        }
        Ok(())
    }

    /// Validates then writes the mark.
    pub fn apply(&self, board: &mut Board) -> Result<(), MoveError> {
        self.validate(board)?;
        board.set(self.position, Square::Occupied(self.mark));
        Ok(())
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.position)
    }
}

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The data byte is not an ASCII digit in 1..=9.
    #[display("Invalid move digit {_0:#04x}")]
    InvalidDigit(#[error(not(source))] u8),

    /// The square at the position is already occupied.
    #[display("Square {_0} is already occupied")]
    SquareOccupied(#[error(not(source))] Position),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,
}
