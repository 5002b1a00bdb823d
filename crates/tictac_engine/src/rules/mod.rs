//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating game state
//! according to tic-tac-toe rules. Rules are separated from board
//! storage so the search and both session state machines share them.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::check_winner;

use crate::types::{Board, GameStatus};

/// Classifies a board as won, drawn or still in progress.
///
/// A completed line takes precedence over a full board.
pub fn evaluate(board: &Board) -> GameStatus {
    if let Some(mark) = check_winner(board) {
        GameStatus::Won(mark)
    } else if is_full(board) {
        GameStatus::Draw
    } else {
        GameStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mark, Position, Square};

    #[test]
    fn test_evaluate_empty_board() {
        assert_eq!(evaluate(&Board::new()), GameStatus::InProgress);
    }

    #[test]
    fn test_evaluate_win_on_full_board() {
        // X X X / O O X / X O O
        let layout = [
            Mark::X,
            Mark::X,
            Mark::X,
            Mark::O,
            Mark::O,
            Mark::X,
            Mark::X,
            Mark::O,
            Mark::O,
        ];
        let mut board = Board::new();
        for (pos, mark) in Position::ALL.into_iter().zip(layout) {
            board.set(pos, Square::Occupied(mark));
        }
        assert_eq!(evaluate(&board), GameStatus::Won(Mark::X));
    }
}
