//! Server role: roster, per-slot state machine, discovery responder and
//! the readiness reactor that ties them to sockets.

mod discovery;
mod reactor;
mod roster;
mod session;

pub use discovery::respond;
pub use reactor::GameServer;
pub use roster::{Roster, Slot};
pub use session::{Directive, Phase, ReleaseReason, SessionGame, Violation};
