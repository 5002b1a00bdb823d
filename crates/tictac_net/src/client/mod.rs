//! Client role: plays O against a server and fails over when it vanishes.

mod failover;
mod game;
mod moves;
mod runner;

pub use failover::{AttemptBudget, Discovery};
pub use game::{ClientDirective, ClientGame};
pub use moves::{ConsolePlayer, MoveSource, SearchPlayer};
pub use runner::{GameClient, GameSummary};
