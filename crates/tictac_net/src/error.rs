//! Error types for the server and client roles.

use std::net::SocketAddr;

use derive_more::{Display, Error, From};
use tictac_engine::MoveError;
use tictac_protocol::{DecodeError, SessionCommand, SlotNumber};

/// Fatal server startup failure.
#[derive(Debug, Display, Error)]
pub enum ServerError {
    /// A listening endpoint could not be created or bound.
    #[display("Failed to bind {endpoint} endpoint on {addr}: {source}")]
    Bind {
        /// Which endpoint ("session" or "discovery").
        endpoint: &'static str,
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// Joining the discovery multicast group failed.
    #[display("Failed to join multicast group {group}: {source}")]
    JoinGroup {
        /// Group address.
        group: std::net::Ipv4Addr,
        /// Underlying failure.
        source: std::io::Error,
    },
}

/// Why the client abandoned a game on protocol grounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum ClientViolation {
    /// Server sent bytes that did not decode.
    #[display("Malformed message: {_0}")]
    Malformed(DecodeError),

    /// Server sent a command the client never accepts, or at the wrong time.
    #[display("Unexpected {_0} from server")]
    #[from(ignore)]
    UnexpectedCommand(#[error(not(source))] SessionCommand),

    /// Server's move referenced another slot.
    #[display("Move for slot {found}, session is slot {expected}")]
    #[from(ignore)]
    SlotMismatch {
        /// Slot adopted at the start of the session.
        expected: SlotNumber,
        /// Slot byte received.
        found: SlotNumber,
    },

    /// Server's move was illegal on the client's board.
    #[display("Illegal server move: {_0}")]
    IllegalMove(MoveError),
}

/// Client failure.
#[derive(Debug, Display, Error, From)]
pub enum ClientError {
    /// Nobody answered a discovery request in time.
    #[display("No server answered discovery within {waited_ms} ms")]
    #[from(ignore)]
    NoServerAvailable {
        /// Discovery wait that elapsed.
        waited_ms: u64,
    },

    /// Connections to advertised servers kept failing.
    #[display("Gave up after {attempts} failed connection attempts")]
    #[from(ignore)]
    AttemptsExhausted {
        /// Size of the budget that ran out.
        attempts: u32,
    },

    /// Discovery socket failure.
    #[display("Discovery socket error: {_0}")]
    Io(std::io::Error),

    /// The move source could not produce a move.
    #[display("Move input failed: {_0}")]
    #[from(ignore)]
    Input(#[error(not(source))] String),

    /// The server broke the protocol; the client left the game.
    #[display("Protocol violation: {_0}")]
    ProtocolViolation(ClientViolation),
}
