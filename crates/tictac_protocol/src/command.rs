//! Command codes for both message families.
//!
//! The two families share one code space: session commands use 0-3 and
//! discovery commands use 4-5, so a datagram can never be mistaken for a
//! session message.

/// Commands carried by a [`SessionMessage`](crate::SessionMessage).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, strum::FromRepr, strum::EnumIter,
)]
#[repr(u8)]
pub enum SessionCommand {
    /// Client asks for a fresh game; the server answers with its opening move.
    #[display("NewGame")]
    NewGame = 0,
    /// A move, with the position digit in the data byte.
    #[display("Move")]
    Move = 1,
    /// The game is over, or the sender is leaving.
    #[display("GameOver")]
    GameOver = 2,
    /// Client transplants a board; a snapshot follows the message.
    #[display("ResumeGame")]
    ResumeGame = 3,
}

impl SessionCommand {
    /// Wire code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Commands carried by a [`DiscoveryDatagram`](crate::DiscoveryDatagram).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, strum::FromRepr, strum::EnumIter,
)]
#[repr(u8)]
pub enum DiscoveryCommand {
    /// A client looking for a server with a free slot.
    #[display("RequestGame")]
    RequestGame = 4,
    /// A server advertising its listening port.
    #[display("GameAvailable")]
    GameAvailable = 5,
}

impl DiscoveryCommand {
    /// Wire code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_code_spaces_do_not_overlap() {
        for session in SessionCommand::iter() {
            assert_eq!(DiscoveryCommand::from_repr(session.code()), None);
        }
        for discovery in DiscoveryCommand::iter() {
            assert_eq!(SessionCommand::from_repr(discovery.code()), None);
        }
    }

    #[test]
    fn test_codes() {
        assert_eq!(SessionCommand::from_repr(3), Some(SessionCommand::ResumeGame));
        assert_eq!(SessionCommand::from_repr(4), None);
        assert_eq!(DiscoveryCommand::from_repr(5), Some(DiscoveryCommand::GameAvailable));
    }
}
