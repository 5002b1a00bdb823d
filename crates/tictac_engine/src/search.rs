//! Exhaustive minimax search.
//!
//! The whole remaining tree is at most nine plies deep, so no pruning is
//! done. Moves are tried in ascending position order and a later move only
//! replaces the current best when it scores strictly higher.

use tracing::instrument;

use crate::position::Position;
use crate::rules::{check_winner, is_full};
use crate::types::{Board, Mark, Square};

/// Score of a win found at depth zero. Larger than the deepest possible ply.
pub const WIN_SCORE: i32 = 10;

/// Picks the best position for `mark` on `board`.
///
/// Returns `None` when the board is already won or full.
#[instrument(level = "debug", skip(board), fields(board = %board.display()))]
pub fn best_move(board: &Board, mark: Mark) -> Option<Position> {
    if check_winner(board).is_some() || is_full(board) {
        return None;
    }

    let mut scratch = board.clone();
    let mut best: Option<(Position, i32)> = None;

    for pos in Position::ALL {
        if !scratch.is_empty(pos) {
            continue;
        }
        scratch.set(pos, Square::Occupied(mark));
        let score = minimax(&mut scratch, mark, 0, false);
        scratch.set(pos, Square::Empty);

        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((pos, score));
        }
    }

    let (pos, score) = best?;
    tracing::debug!(position = pos.number(), score, "Search complete");
    Some(pos)
}

/// Scores `board` from `maximizer`'s point of view.
///
/// `depth` counts plies played after the root move.
fn minimax(board: &mut Board, maximizer: Mark, depth: i32, maximizing: bool) -> i32 {
    if let Some(winner) = check_winner(board) {
        return if winner == maximizer {
            WIN_SCORE - depth
        } else {
            -WIN_SCORE + depth
        };
    }
    if is_full(board) {
        return 0;
    }

    let to_move = if maximizing {
        maximizer
    } else {
        maximizer.opponent()
    };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };

    for pos in Position::ALL {
        if !board.is_empty(pos) {
            continue;
        }
        board.set(pos, Square::Occupied(to_move));
        let score = minimax(board, maximizer, depth + 1, !maximizing);
        board.set(pos, Square::Empty);

        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_of(cells: &str) -> Board {
        let mut board = Board::new();
        for (pos, c) in Position::ALL.into_iter().zip(cells.chars()) {
            if let Some(mark) = Mark::from_byte(c as u8) {
                board.set(pos, Square::Occupied(mark));
            }
        }
        board
    }

    #[test]
    fn test_empty_board_opens_at_one() {
        assert_eq!(best_move(&Board::new(), Mark::X), Some(Position::TopLeft));
    }

    #[test]
    fn test_takes_immediate_win() {
        let board = board_of("XX.OO....");
        assert_eq!(best_move(&board, Mark::X), Some(Position::TopRight));
    }

    #[test]
    fn test_blocks_opponent() {
        // O threatens 4-5-6; X must take 6.
        let board = board_of("X..OO...X");
        assert_eq!(best_move(&board, Mark::X), Some(Position::MiddleRight));
    }

    #[test]
    fn test_none_on_terminal_board() {
        assert_eq!(best_move(&board_of("XXXOO...."), Mark::O), None);
        assert_eq!(best_move(&board_of("XOXOXXOXO"), Mark::X), None);
    }

    #[test]
    fn test_win_on_first_ply_scores_full() {
        let mut board = board_of("XX.OO....");
        board.set(Position::TopRight, Square::Occupied(Mark::X));
        assert_eq!(minimax(&mut board, Mark::X, 0, false), WIN_SCORE);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let board = board_of("X...O....");
        let before = board.clone();
        let _ = best_move(&board, Mark::X);
        assert_eq!(board, before);
    }
}
