//! Framing on a session connection.
//!
//! The client reads with the async helpers, which wait for exactly one
//! fixed-size frame. The server reads without blocking and feeds whatever
//! arrived into a [`FrameAssembler`], which hands out complete frames.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::instrument;

use crate::command::SessionCommand;
use crate::error::{DecodeError, FrameError};
use crate::message::{SESSION_MESSAGE_SIZE, SessionMessage};
use crate::snapshot::{BoardSnapshot, SNAPSHOT_SIZE};

/// A complete inbound unit: a message plus, for ResumeGame, its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// The decoded message.
    pub message: SessionMessage,
    /// Snapshot following a ResumeGame message.
    pub snapshot: Option<BoardSnapshot>,
}

impl Frame {
    /// A frame with no trailing snapshot.
    pub fn message(message: SessionMessage) -> Self {
        Self {
            message,
            snapshot: None,
        }
    }

    /// A ResumeGame frame.
    pub fn resume(snapshot: BoardSnapshot) -> Self {
        Self {
            message: SessionMessage::resume_game(),
            snapshot: Some(snapshot),
        }
    }
}

/// Reads exactly `buf.len()` bytes, mapping early EOF to a disconnect.
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(FrameError::Disconnected),
        Err(e) => Err(FrameError::Io(e)),
    }
}

/// Waits for one session message.
pub async fn read_message<R>(reader: &mut R) -> Result<SessionMessage, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; SESSION_MESSAGE_SIZE];
    read_full(reader, &mut buf).await?;
    Ok(SessionMessage::decode(&buf)?)
}

/// Waits for the 9 snapshot bytes that follow a ResumeGame message.
///
/// Only the length is checked here; see [`BoardSnapshot::to_board`].
pub async fn read_snapshot<R>(reader: &mut R) -> Result<BoardSnapshot, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; SNAPSHOT_SIZE];
    read_full(reader, &mut buf).await?;
    Ok(BoardSnapshot::from_bytes(buf))
}

/// Waits for one complete frame, including a ResumeGame snapshot.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, FrameError>
where
    R: AsyncRead + Unpin,
{
    let message = read_message(reader).await?;
    let snapshot = match message.command() {
        SessionCommand::ResumeGame => Some(read_snapshot(reader).await?),
        _ => None,
    };
    Ok(Frame { message, snapshot })
}

/// Writes one session message and flushes.
#[instrument(level = "debug", skip_all, fields(%message))]
pub async fn write_message<W>(writer: &mut W, message: &SessionMessage) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&message.encode()).await?;
    writer.flush().await?;
    Ok(())
}

/// Writes a ResumeGame message followed by its snapshot, then flushes.
#[instrument(level = "debug", skip_all)]
pub async fn write_resume<W>(writer: &mut W, snapshot: &BoardSnapshot) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; SESSION_MESSAGE_SIZE + SNAPSHOT_SIZE];
    buf[..SESSION_MESSAGE_SIZE].copy_from_slice(&SessionMessage::resume_game().encode());
    buf[SESSION_MESSAGE_SIZE..].copy_from_slice(snapshot.as_bytes());
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Accumulates bytes from non-blocking reads and yields complete frames.
///
/// A message is decoded as soon as its 4 bytes are present, so a bad
/// version or command is reported without waiting for more input.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buf: Vec<u8>,
}

impl FrameAssembler {
    /// Creates an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly read bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drops anything buffered (used when a slot is released).
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Takes the next complete frame, if one has fully arrived.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, DecodeError> {
        if self.buf.len() < SESSION_MESSAGE_SIZE {
            return Ok(None);
        }
        let message = SessionMessage::decode(&self.buf[..SESSION_MESSAGE_SIZE])?;

        let (snapshot, consumed) = match message.command() {
            SessionCommand::ResumeGame => {
                let end = SESSION_MESSAGE_SIZE + SNAPSHOT_SIZE;
                if self.buf.len() < end {
                    return Ok(None);
                }
                let snapshot = BoardSnapshot::decode(&self.buf[SESSION_MESSAGE_SIZE..end])?;
                (Some(snapshot), end)
            }
            _ => (None, SESSION_MESSAGE_SIZE),
        };

        self.buf.drain(..consumed);
        Ok(Some(Frame { message, snapshot }))
    }
}
