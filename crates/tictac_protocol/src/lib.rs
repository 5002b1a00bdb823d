//! Wire protocol for networked tic-tac-toe.
//!
//! Two fixed-size message families share one version byte:
//!
//! - [`SessionMessage`]: 4 bytes over the per-game TCP connection
//!   (`version, command, data, slot`). A ResumeGame message is followed by
//!   a 9-byte [`BoardSnapshot`].
//! - [`DiscoveryDatagram`]: 4 bytes over the multicast group
//!   (`version, command, port_hi, port_lo`).
//!
//! Decoding rejects any version other than [`PROTOCOL_VERSION`] and any
//! command code outside the family's set. Encoding cannot fail.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod command;
mod discovery;
mod error;
mod framing;
mod message;
mod snapshot;
mod types;

pub use command::{DiscoveryCommand, SessionCommand};
pub use discovery::{DATAGRAM_SIZE, DiscoveryDatagram};
pub use error::{DecodeError, FrameError};
pub use framing::{
    Frame, FrameAssembler, read_frame, read_message, read_snapshot, write_message, write_resume,
};
pub use message::{PROTOCOL_VERSION, SESSION_MESSAGE_SIZE, SessionMessage};
pub use snapshot::{BoardSnapshot, SNAPSHOT_SIZE};
pub use types::SlotNumber;
