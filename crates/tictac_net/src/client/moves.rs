//! Where the client's own moves come from.

use tictac_engine::{Board, Mark, Position, best_move};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, instrument};

use crate::error::ClientError;

/// Source of moves for the client's mark.
#[async_trait::async_trait]
pub trait MoveSource: Send {
    /// Picks an empty position on `board` for `mark`.
    async fn choose(&mut self, board: &Board, mark: Mark) -> Result<Position, ClientError>;

    /// Returns the player's display name.
    fn name(&self) -> &str;
}

/// Plays with the same search the server uses.
#[derive(Debug, Clone, Default)]
pub struct SearchPlayer;

#[async_trait::async_trait]
impl MoveSource for SearchPlayer {
    #[instrument(skip_all, fields(%mark))]
    async fn choose(&mut self, board: &Board, mark: Mark) -> Result<Position, ClientError> {
        let position = best_move(board, mark)
            .ok_or_else(|| ClientError::Input("no empty square left".to_string()))?;
        debug!(position = position.number(), "Search chose position");
        Ok(position)
    }

    fn name(&self) -> &str {
        "search"
    }
}

/// Reads digits from a line-oriented reader (standard input by default),
/// re-prompting until a legal move is entered.
pub struct ConsolePlayer<R> {
    lines: Lines<R>,
}

impl ConsolePlayer<BufReader<Stdin>> {
    /// Player reading from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> ConsolePlayer<R> {
    /// Player reading from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncBufRead + Unpin + Send> MoveSource for ConsolePlayer<R> {
    async fn choose(&mut self, board: &Board, mark: Mark) -> Result<Position, ClientError> {
        println!("\n{}\n", board.display());
        loop {
            println!("Player {} ({mark}), enter a number: ", mark.player_number());
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| ClientError::Input(format!("failed to read move: {e}")))?
                .ok_or_else(|| ClientError::Input("input closed".to_string()))?;

            match Position::parse_input(&line) {
                Some(position) if board.is_empty(position) => return Ok(position),
                Some(position) => println!("Square {} is taken.", position.number()),
                None => println!("Invalid move '{}'.", line.trim()),
            }
        }
    }

    fn name(&self) -> &str {
        "console"
    }
}
