//! The multicast discovery datagram.

use tracing::instrument;

use crate::command::DiscoveryCommand;
use crate::error::DecodeError;
use crate::message::PROTOCOL_VERSION;

/// Encoded size of a discovery datagram.
pub const DATAGRAM_SIZE: usize = 4;

/// A discovery datagram: `version, command, port_hi, port_lo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryDatagram {
    /// A client looking for a free slot. Port bytes are zero.
    RequestGame,
    /// A server with a free slot, listening on `port`.
    GameAvailable {
        /// The responder's TCP listening port.
        port: u16,
    },
}

impl DiscoveryDatagram {
    /// Command code of this datagram.
    pub fn command(&self) -> DiscoveryCommand {
        match self {
            DiscoveryDatagram::RequestGame => DiscoveryCommand::RequestGame,
            DiscoveryDatagram::GameAvailable { .. } => DiscoveryCommand::GameAvailable,
        }
    }

    /// Encodes to wire bytes; the port is big-endian.
    pub fn encode(&self) -> [u8; DATAGRAM_SIZE] {
        let port = match self {
            DiscoveryDatagram::RequestGame => 0,
            DiscoveryDatagram::GameAvailable { port } => *port,
        };
        let [hi, lo] = port.to_be_bytes();
        [PROTOCOL_VERSION, self.command().code(), hi, lo]
    }

    /// Decodes one received datagram.
    #[instrument(level = "trace")]
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let [version, command, hi, lo] =
            <[u8; DATAGRAM_SIZE]>::try_from(bytes).map_err(|_| DecodeError::WrongLength {
                found: bytes.len(),
                expected: DATAGRAM_SIZE,
            })?;
        if version != PROTOCOL_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                found: version,
                expected: PROTOCOL_VERSION,
            });
        }
        match DiscoveryCommand::from_repr(command) {
            Some(DiscoveryCommand::RequestGame) => Ok(DiscoveryDatagram::RequestGame),
            Some(DiscoveryCommand::GameAvailable) => Ok(DiscoveryDatagram::GameAvailable {
                port: u16::from_be_bytes([hi, lo]),
            }),
            None => Err(DecodeError::UnknownCommand(command)),
        }
    }
}

impl std::fmt::Display for DiscoveryDatagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryDatagram::RequestGame => write!(f, "RequestGame"),
            DiscoveryDatagram::GameAvailable { port } => write!(f, "GameAvailable (port {port})"),
        }
    }
}
