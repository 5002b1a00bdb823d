//! Networked tic-tac-toe: a multiplexing server and a failover client.
//!
//! # Architecture
//!
//! - **server**: a single-task reactor owning a fixed roster of session
//!   slots, the TCP listener and the multicast discovery socket. Each slot
//!   runs a transport-free [`SessionGame`](server::SessionGame) state
//!   machine; the reactor only moves bytes.
//! - **client**: plays Player 2 against a server. When the connection
//!   drops it asks the multicast group for another server and resumes the
//!   game there by sending its board.
//! - **config**: deployment constants (multicast group, roster capacity,
//!   discovery timeout and attempt budget), optionally read from TOML.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod client;
mod config;
mod error;
pub mod server;

pub use client::{
    AttemptBudget, ClientGame, ConsolePlayer, Discovery, GameClient, GameSummary, MoveSource,
    SearchPlayer,
};
pub use config::{ConfigError, NetConfig};
pub use error::{ClientError, ClientViolation, ServerError};
pub use server::{GameServer, ReleaseReason, Roster, SessionGame, Violation};
