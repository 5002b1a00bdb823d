//! Win detection logic for tic-tac-toe.

use crate::position::Position;
use crate::types::{Board, Mark, Square};

/// The 8 winning lines: rows, then columns, then diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(mark)` if the mark has three in a row,
/// `None` otherwise.
pub fn check_winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|[a, b, c]| match board.get(*a) {
        Square::Occupied(mark) if board.get(*b) == board.get(*a) && board.get(*c) == board.get(*a) => {
            Some(mark)
        }
        _ => None,
    })
}
