//! The fixed-size session message.

use tictac_engine::Position;
use tracing::instrument;

use crate::command::SessionCommand;
use crate::error::DecodeError;
use crate::types::SlotNumber;

/// The single protocol version spoken by both roles.
pub const PROTOCOL_VERSION: u8 = 6;

/// Encoded size of a session message.
pub const SESSION_MESSAGE_SIZE: usize = 4;

/// One session message: `version, command, data, slot`.
///
/// `data` is the ASCII digit of a Move and zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionMessage {
    command: SessionCommand,
    data: u8,
    slot: SlotNumber,
}

impl SessionMessage {
    /// Builds a message from its fields.
    pub fn new(command: SessionCommand, data: u8, slot: SlotNumber) -> Self {
        Self {
            command,
            data,
            slot,
        }
    }

    /// Request for a fresh game.
    pub fn new_game() -> Self {
        Self::new(SessionCommand::NewGame, 0, SlotNumber::UNASSIGNED)
    }

    /// A move to `position` within `slot`.
    pub fn move_to(position: Position, slot: SlotNumber) -> Self {
        Self::new(SessionCommand::Move, position.to_digit(), slot)
    }

    /// End-of-game (or leaving) notice for `slot`.
    pub fn game_over(slot: SlotNumber) -> Self {
        Self::new(SessionCommand::GameOver, 0, slot)
    }

    /// Resume header; the caller sends a snapshot right after it.
    pub fn resume_game() -> Self {
        Self::new(SessionCommand::ResumeGame, 0, SlotNumber::UNASSIGNED)
    }

    /// The command.
    pub fn command(&self) -> SessionCommand {
        self.command
    }

    /// Raw data byte.
    pub fn data(&self) -> u8 {
        self.data
    }

    /// Slot byte as sent.
    pub fn slot(&self) -> SlotNumber {
        self.slot
    }

    /// The data byte read as a move digit.
    pub fn position(&self) -> Option<Position> {
        Position::from_digit(self.data)
    }

    /// Encodes to wire bytes.
    pub fn encode(&self) -> [u8; SESSION_MESSAGE_SIZE] {
        [
            PROTOCOL_VERSION,
            self.command.code(),
            self.data,
            self.slot.get(),
        ]
    }

    /// Decodes wire bytes, validating length, version and command.
    #[instrument(level = "trace")]
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let [version, command, data, slot] = <[u8; SESSION_MESSAGE_SIZE]>::try_from(bytes)
            .map_err(|_| DecodeError::WrongLength {
                found: bytes.len(),
                expected: SESSION_MESSAGE_SIZE,
            })?;
        if version != PROTOCOL_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                found: version,
                expected: PROTOCOL_VERSION,
            });
        }
        let command = SessionCommand::from_repr(command).ok_or(DecodeError::UnknownCommand(command))?;
        Ok(Self::new(command, data, SlotNumber::new(slot)))
    }
}

impl std::fmt::Display for SessionMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.command {
            SessionCommand::Move => write!(
                f,
                "Move '{}' (slot {})",
                char::from(self.data).escape_default(),
                self.slot
            ),
            other => write!(f, "{other} (slot {})", self.slot),
        }
    }
}
