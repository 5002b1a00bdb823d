//! Board snapshot sent after a ResumeGame message.

use tictac_engine::{Board, Mark, Position, Square};

use crate::error::DecodeError;

/// Encoded size of a board snapshot.
pub const SNAPSHOT_SIZE: usize = 9;

/// Nine raw cell bytes: `0` for a cell still holding its label, otherwise
/// the mark byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardSnapshot([u8; SNAPSHOT_SIZE]);

impl BoardSnapshot {
    /// Captures a board.
    pub fn from_board(board: &Board) -> Self {
        let mut bytes = [0u8; SNAPSHOT_SIZE];
        for (byte, square) in bytes.iter_mut().zip(board.squares()) {
            if let Square::Occupied(mark) = square {
                *byte = mark.to_byte();
            }
        }
        Self(bytes)
    }

    /// Wraps received bytes without checking them; see [`Self::to_board`].
    pub fn from_bytes(bytes: [u8; SNAPSHOT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Wraps a received buffer of exactly [`SNAPSHOT_SIZE`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        <[u8; SNAPSHOT_SIZE]>::try_from(bytes)
            .map(Self)
            .map_err(|_| DecodeError::WrongLength {
                found: bytes.len(),
                expected: SNAPSHOT_SIZE,
            })
    }

    /// Raw bytes for the wire.
    pub fn as_bytes(&self) -> &[u8; SNAPSHOT_SIZE] {
        &self.0
    }

    /// Rebuilds the board, rejecting foreign bytes and impossible mark counts.
    pub fn to_board(&self) -> Result<Board, DecodeError> {
        let mut board = Board::new();
        for (index, &byte) in self.0.iter().enumerate() {
            if byte == 0 {
                continue;
            }
            let mark = Mark::from_byte(byte).ok_or(DecodeError::InvalidSnapshotCell {
                cell: index + 1,
                byte,
            })?;
            if let Some(pos) = Position::from_index(index) {
                board.set(pos, Square::Occupied(mark));
            }
        }

        let (x, o) = (board.count(Mark::X), board.count(Mark::O));
        if x.abs_diff(o) > 1 {
            return Err(DecodeError::UnbalancedSnapshot { x, o });
        }
        Ok(board)
    }
}
