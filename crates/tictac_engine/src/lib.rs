//! Pure tic-tac-toe game logic for the networked tic-tac-toe service.
//!
//! # Architecture
//!
//! - **Types**: marks, squares, the 3x3 board and the game status
//! - **Position**: the nine board cells, numbered 1-9 on the wire
//! - **Rules**: win, draw and overall evaluation of a board
//! - **Action**: move validation and application
//! - **Search**: exhaustive minimax picking a deterministic optimal move
//!
//! Nothing in this crate touches a socket. The server's session state
//! machine borrows a board for one command at a time and drives it through
//! these functions.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod position;
pub mod rules;
mod search;
mod types;

pub use action::{Move, MoveError};
pub use position::Position;
pub use rules::{check_winner, evaluate, is_draw, is_full};
pub use search::{WIN_SCORE, best_move};
pub use types::{Board, GameStatus, Mark, Square};
