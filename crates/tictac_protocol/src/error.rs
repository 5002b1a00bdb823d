//! Protocol error types.

/// A byte sequence that is not a valid message of the expected family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DecodeError {
    /// Version byte is not the supported protocol version.
    #[display("Unsupported protocol version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version byte received.
        found: u8,
        /// Version this build speaks.
        expected: u8,
    },

    /// Command code outside the message family's set.
    #[display("Unknown command code {_0}")]
    UnknownCommand(#[error(not(source))] u8),

    /// Buffer is not exactly the family's fixed size.
    #[display("Wrong message length {found} (expected {expected})")]
    WrongLength {
        /// Bytes received.
        found: usize,
        /// Fixed size of the family.
        expected: usize,
    },

    /// Snapshot cell that is neither 0 nor a mark byte.
    #[display("Invalid snapshot byte {byte:#04x} at cell {cell}")]
    InvalidSnapshotCell {
        /// 1-based cell number.
        cell: usize,
        /// Offending byte.
        byte: u8,
    },

    /// Snapshot whose mark counts differ by more than one.
    #[display("Unbalanced snapshot: {x} X marks, {o} O marks")]
    UnbalancedSnapshot {
        /// Count of X marks.
        x: usize,
        /// Count of O marks.
        o: usize,
    },
}

/// Failure to read or write one frame on a session connection.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum FrameError {
    /// The peer closed the connection (zero-length read or early EOF).
    #[display("Peer disconnected")]
    #[from(ignore)]
    Disconnected,

    /// Transport failure.
    #[display("Transport error: {_0}")]
    Io(std::io::Error),

    /// Bytes arrived but did not decode.
    #[display("Decode error: {_0}")]
    Decode(DecodeError),
}

impl FrameError {
    /// Whether this failure means the connection itself is gone.
    ///
    /// Decode failures leave the connection usable but untrusted.
    pub fn is_transport(&self) -> bool {
        matches!(self, FrameError::Disconnected | FrameError::Io(_))
    }
}
