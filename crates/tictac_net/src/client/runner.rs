//! Drives one client game across any number of server failovers.

use std::net::SocketAddr;

use derive_getters::Getters;
use derive_new::new;
use tictac_engine::{Board, GameStatus};
use tictac_protocol::{
    BoardSnapshot, FrameError, SlotNumber, read_message, write_message, write_resume,
};
use tokio::net::TcpStream;
use tracing::{error, info, instrument, warn};

use super::failover::{AttemptBudget, Discovery};
use super::game::{ClientDirective, ClientGame};
use super::moves::MoveSource;
use crate::error::{ClientError, ClientViolation};

/// How a finished game ended, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct GameSummary {
    /// Outcome on the final board; in progress means the server ended it early.
    status: GameStatus,
    /// Slot on the last server, if one was adopted.
    slot: Option<SlotNumber>,
    /// Final board.
    board: Board,
    /// Times the client moved the game to another server.
    failovers: u32,
}

/// How a session attempt ended.
enum SessionEnd {
    /// The connection is gone; try another server.
    Lost(FrameError),
    /// The client cannot continue.
    Fatal(ClientError),
}

/// Only writes go through this; reads handle decode errors themselves.
impl From<FrameError> for SessionEnd {
    fn from(err: FrameError) -> Self {
        SessionEnd::Lost(err)
    }
}

impl From<ClientError> for SessionEnd {
    fn from(err: ClientError) -> Self {
        SessionEnd::Fatal(err)
    }
}

/// Whether a connection starts a new game or resumes the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opening {
    NewGame,
    Resume,
}

/// The client: a move source plus the means to find another server.
pub struct GameClient<P> {
    player: P,
    discovery: Discovery,
    budget: AttemptBudget,
}

impl<P: MoveSource> GameClient<P> {
    /// Creates a client.
    pub fn new(player: P, discovery: Discovery, budget: AttemptBudget) -> Self {
        Self {
            player,
            discovery,
            budget,
        }
    }

    /// Attempts left in the failover budget.
    pub fn remaining_attempts(&self) -> u32 {
        self.budget.remaining()
    }

    /// Plays one game, starting at `server`.
    ///
    /// If `server` cannot be reached the client discovers another and
    /// starts a new game there. Once a game is underway, losing the
    /// connection moves it to a discovered server with ResumeGame.
    #[instrument(skip(self), fields(player = self.player.name()))]
    pub async fn play(&mut self, server: SocketAddr) -> Result<GameSummary, ClientError> {
        let mut game = ClientGame::new();
        let mut failovers: u32 = 0;

        let mut stream = match TcpStream::connect(server).await {
            Ok(stream) => {
                info!(%server, "Connected");
                stream
            }
            Err(e) => {
                warn!(%server, error = %e, "Initial server unreachable; discovering another");
                self.reconnect().await?
            }
        };
        let mut opening = Opening::NewGame;

        loop {
            match self.session(&mut stream, &mut game, opening).await {
                Ok(status) => {
                    info!(%status, failovers, "Game ended");
                    return Ok(GameSummary::new(
                        status,
                        game.slot(),
                        game.board().clone(),
                        failovers,
                    ));
                }
                Err(SessionEnd::Lost(e)) => {
                    warn!(error = %e, "Lost server; failing over");
                    drop(stream);
                    stream = self.reconnect().await?;
                    game.prepare_resume();
                    opening = Opening::Resume;
                    failovers += 1;
                }
                Err(SessionEnd::Fatal(e)) => {
                    error!(error = %e, "Leaving game");
                    return Err(e);
                }
            }
        }
    }

    /// Finds a server and connects, spending the budget on failures.
    async fn reconnect(&mut self) -> Result<TcpStream, ClientError> {
        loop {
            let server = self.discovery.locate().await?;
            match TcpStream::connect(server).await {
                Ok(stream) => {
                    info!(%server, "Connected to discovered server");
                    return Ok(stream);
                }
                Err(e) => {
                    warn!(
                        %server,
                        error = %e,
                        remaining = self.budget.remaining(),
                        "Connection to discovered server failed"
                    );
                    self.budget.spend()?;
                }
            }
        }
    }

    /// Plays on one connection until the game ends or the connection does.
    async fn session(
        &mut self,
        stream: &mut TcpStream,
        game: &mut ClientGame,
        opening: Opening,
    ) -> Result<GameStatus, SessionEnd> {
        match opening {
            Opening::NewGame => write_message(stream, &game.start_new()).await?,
            Opening::Resume => {
                write_resume(stream, &BoardSnapshot::from_board(game.board())).await?
            }
        }

        loop {
            let message = match read_message(stream).await {
                Ok(message) => message,
                Err(FrameError::Decode(e)) => {
                    Self::farewell(stream, game).await;
                    return Err(SessionEnd::Fatal(ClientViolation::Malformed(e).into()));
                }
                Err(transport) => return Err(SessionEnd::Lost(transport)),
            };
            match game.handle(&message) {
                ClientDirective::Play => {
                    let position = self.player.choose(game.board(), ClientGame::MARK).await?;
                    let reply = game
                        .play(position)
                        .map_err(|e| ClientError::Input(format!("illegal move chosen: {e}")))?;
                    write_message(stream, &reply).await?;
                }
                ClientDirective::Conclude(status) => {
                    Self::farewell(stream, game).await;
                    return Ok(status);
                }
                ClientDirective::Finish(status) => return Ok(status),
                ClientDirective::Leave(violation) => {
                    Self::farewell(stream, game).await;
                    return Err(SessionEnd::Fatal(violation.into()));
                }
            }
        }
    }

    /// Sends GameOver; the session is ending either way.
    async fn farewell(stream: &mut TcpStream, game: &ClientGame) {
        if let Err(e) = write_message(stream, &game.game_over()).await {
            warn!(error = %e, "GameOver not delivered");
        }
    }
}
