//! Per-slot session state machine.
//!
//! [`SessionGame`] never sees a socket. The reactor hands it one decoded
//! frame at a time and carries out the returned [`Directive`].

use derive_more::{Display, Error, From};
use tictac_engine::{Board, GameStatus, Mark, Move, MoveError, best_move, evaluate};
use tictac_protocol::{
    BoardSnapshot, DecodeError, Frame, SessionCommand, SessionMessage, SlotNumber,
};
use tracing::{debug, instrument};

/// The server always plays first, as X.
const SERVER_MARK: Mark = Mark::X;
/// The client plays O.
const PEER_MARK: Mark = Mark::O;

/// Where a slot is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    /// No connection bound.
    #[display("empty")]
    Empty,
    /// Connection bound, waiting for NewGame or ResumeGame.
    #[display("awaiting first command")]
    AwaitingFirstCommand,
    /// Moves are being exchanged.
    #[display("in progress")]
    InProgress,
    /// Outcome decided by the server's own move; waiting for GameOver.
    #[display("concluded")]
    Concluded,
}

/// Why a peer's input was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum Violation {
    /// Bytes that did not decode (bad version, command or length).
    #[display("malformed message: {_0}")]
    Malformed(DecodeError),

    /// A command that is not valid in the slot's current phase.
    #[display("{command} not allowed while {phase}")]
    #[from(ignore)]
    UnexpectedCommand {
        /// Command received.
        command: SessionCommand,
        /// Phase it arrived in.
        phase: Phase,
    },

    /// A Move or GameOver naming another slot.
    #[display("slot byte {found} sent to slot {expected}")]
    #[from(ignore)]
    SlotMismatch {
        /// Receiving slot.
        expected: SlotNumber,
        /// Slot byte in the message.
        found: SlotNumber,
    },

    /// The peer's move failed validation.
    #[display("illegal move: {_0}")]
    IllegalMove(MoveError),

    /// A resumed board where it is not the server's turn.
    #[display("resumed board has {x} X and {o} O; expected equal counts")]
    #[from(ignore)]
    OutOfTurn {
        /// Count of server marks.
        x: usize,
        /// Count of peer marks.
        o: usize,
    },

    /// A ResumeGame frame arrived without its snapshot.
    #[display("resume without snapshot")]
    #[from(ignore)]
    MissingSnapshot,
}

/// Why a slot gave up its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReleaseReason {
    /// The game reached an outcome.
    #[display("game finished ({_0})")]
    GameFinished(GameStatus),
    /// The peer sent GameOver before any outcome.
    #[display("peer left before a decision")]
    PeerLeft,
    /// The peer broke the protocol.
    #[display("protocol violation: {_0}")]
    ProtocolViolation(Violation),
    /// The peer disconnected or a send or receive failed.
    #[display("transport failure")]
    TransportFailure,
}

/// What the reactor must do after a frame is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Send the message and keep the slot bound.
    Send(SessionMessage),
    /// Send the message, then release the slot.
    Finish(SessionMessage, ReleaseReason),
    /// Release the slot without replying.
    Release(ReleaseReason),
}

/// One slot's game: its phase, board and outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGame {
    phase: Phase,
    board: Board,
    status: GameStatus,
}

impl Default for SessionGame {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGame {
    /// Creates an unbound game.
    pub fn new() -> Self {
        Self {
            phase: Phase::Empty,
            board: Board::new(),
            status: GameStatus::InProgress,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Recorded outcome.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// A connection was bound to the slot.
    pub fn start(&mut self) {
        self.reset();
        self.phase = Phase::AwaitingFirstCommand;
    }

    /// The connection was released; back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Handles one inbound frame for slot `slot`.
    #[instrument(skip_all, fields(%slot, phase = %self.phase, message = %frame.message))]
    pub fn handle(&mut self, slot: SlotNumber, frame: Frame) -> Directive {
        let message = frame.message;
        let result = match (message.command(), self.phase) {
            (SessionCommand::NewGame, Phase::AwaitingFirstCommand) => Ok(self.new_game(slot)),
            (SessionCommand::ResumeGame, Phase::AwaitingFirstCommand) => {
                self.resume(slot, frame.snapshot)
            }
            (SessionCommand::Move, Phase::InProgress) => self
                .check_slot(slot, &message)
                .and_then(|()| self.peer_move(slot, message.data())),
            (SessionCommand::GameOver, Phase::AwaitingFirstCommand) => {
                Ok(Directive::Release(ReleaseReason::PeerLeft))
            }
            (SessionCommand::GameOver, Phase::InProgress | Phase::Concluded) => self
                .check_slot(slot, &message)
                .map(|()| self.game_over()),
            (command, phase) => Err(Violation::UnexpectedCommand { command, phase }),
        };

        result.unwrap_or_else(|violation| {
            Directive::Release(ReleaseReason::ProtocolViolation(violation))
        })
    }

    fn check_slot(&self, slot: SlotNumber, message: &SessionMessage) -> Result<(), Violation> {
        if message.slot() == slot {
            Ok(())
        } else {
            Err(Violation::SlotMismatch {
                expected: slot,
                found: message.slot(),
            })
        }
    }

    fn new_game(&mut self, slot: SlotNumber) -> Directive {
        self.board = Board::new();
        self.status = GameStatus::InProgress;
        self.server_move(slot)
    }

    fn resume(
        &mut self,
        slot: SlotNumber,
        snapshot: Option<BoardSnapshot>,
    ) -> Result<Directive, Violation> {
        let board = snapshot.ok_or(Violation::MissingSnapshot)?.to_board()?;
        let (x, o) = (board.count(SERVER_MARK), board.count(PEER_MARK));
        if x != o {
            return Err(Violation::OutOfTurn { x, o });
        }
        debug!(board = %board.display(), "Restoring board");
        self.board = board;

        match evaluate(&self.board) {
            GameStatus::InProgress => Ok(self.server_move(slot)),
            decided => Ok(self.conclude(slot, decided)),
        }
    }

    fn peer_move(&mut self, slot: SlotNumber, digit: u8) -> Result<Directive, Violation> {
        let mv = Move::from_digit(PEER_MARK, digit)?;
        mv.apply(&mut self.board)?;
        debug!(position = mv.position.number(), "Peer moved");

        match evaluate(&self.board) {
            GameStatus::InProgress => Ok(self.server_move(slot)),
            decided => Ok(self.conclude(slot, decided)),
        }
    }

    fn game_over(&mut self) -> Directive {
        let reason = match self.status {
            GameStatus::InProgress => ReleaseReason::PeerLeft,
            decided => ReleaseReason::GameFinished(decided),
        };
        Directive::Release(reason)
    }

    /// Picks and plays the server's move; the board must be undecided.
    fn server_move(&mut self, slot: SlotNumber) -> Directive {
        let Some(position) = best_move(&self.board, SERVER_MARK) else {
            let decided = evaluate(&self.board);
            return self.conclude(slot, decided);
        };
        if let Err(e) = Move::new(SERVER_MARK, position).apply(&mut self.board) {
            // The search only returns empty cells on undecided boards.
            tracing::error!(error = %e, "Search produced an illegal move");
            return Directive::Release(ReleaseReason::ProtocolViolation(Violation::IllegalMove(e)));
        }

        self.status = evaluate(&self.board);
        self.phase = if self.status.is_over() {
            Phase::Concluded
        } else {
            Phase::InProgress
        };
        debug!(position = position.number(), status = %self.status, "Server moved");
        Directive::Send(SessionMessage::move_to(position, slot))
    }

    fn conclude(&mut self, slot: SlotNumber, decided: GameStatus) -> Directive {
        self.status = decided;
        self.phase = Phase::Concluded;
        Directive::Finish(
            SessionMessage::game_over(slot),
            ReleaseReason::GameFinished(decided),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictac_engine::{Position, Square};

    const SLOT: SlotNumber = SlotNumber::new(2);

    fn started() -> SessionGame {
        let mut game = SessionGame::new();
        game.start();
        game
    }

    fn peer_move(position: Position) -> Frame {
        Frame::message(SessionMessage::move_to(position, SLOT))
    }

    #[test]
    fn test_new_game_opens_at_one() {
        let mut game = started();
        let directive = game.handle(SLOT, Frame::message(SessionMessage::new_game()));
        assert_eq!(
            directive,
            Directive::Send(SessionMessage::move_to(Position::TopLeft, SLOT))
        );
        assert_eq!(game.phase(), Phase::InProgress);
    }

    #[test]
    fn test_move_before_new_game_is_violation() {
        let mut game = started();
        let directive = game.handle(SLOT, peer_move(Position::Center));
        assert!(matches!(
            directive,
            Directive::Release(ReleaseReason::ProtocolViolation(
                Violation::UnexpectedCommand { .. }
            ))
        ));
    }

    #[test]
    fn test_occupied_square_is_violation() {
        let mut game = started();
        game.handle(SLOT, Frame::message(SessionMessage::new_game()));
        let directive = game.handle(SLOT, peer_move(Position::TopLeft));
        assert_eq!(
            directive,
            Directive::Release(ReleaseReason::ProtocolViolation(Violation::IllegalMove(
                MoveError::SquareOccupied(Position::TopLeft)
            )))
        );
    }

    #[test]
    fn test_bad_digit_is_violation() {
        let mut game = started();
        game.handle(SLOT, Frame::message(SessionMessage::new_game()));
        let frame = Frame::message(SessionMessage::new(SessionCommand::Move, b'0', SLOT));
        assert_eq!(
            game.handle(SLOT, frame),
            Directive::Release(ReleaseReason::ProtocolViolation(Violation::IllegalMove(
                MoveError::InvalidDigit(b'0')
            )))
        );
    }

    #[test]
    fn test_wrong_slot_is_violation() {
        let mut game = started();
        game.handle(SLOT, Frame::message(SessionMessage::new_game()));
        let frame = Frame::message(SessionMessage::move_to(Position::Center, SlotNumber::new(9)));
        assert!(matches!(
            game.handle(SLOT, frame),
            Directive::Release(ReleaseReason::ProtocolViolation(Violation::SlotMismatch { .. }))
        ));
    }

    #[test]
    fn test_game_over_mid_game_is_peer_left() {
        let mut game = started();
        game.handle(SLOT, Frame::message(SessionMessage::new_game()));
        let directive = game.handle(SLOT, Frame::message(SessionMessage::game_over(SLOT)));
        assert_eq!(directive, Directive::Release(ReleaseReason::PeerLeft));
    }

    #[test]
    fn test_resume_replies_with_server_move() {
        let mut board = Board::new();
        board.set(Position::TopLeft, Square::Occupied(Mark::X));
        board.set(Position::Center, Square::Occupied(Mark::O));

        let mut game = started();
        let directive = game.handle(SLOT, Frame::resume(BoardSnapshot::from_board(&board)));
        let Directive::Send(reply) = directive else {
            panic!("expected a move, got {directive:?}");
        };
        assert_eq!(reply.command(), SessionCommand::Move);
        assert_eq!(reply.slot(), SLOT);
        assert_eq!(game.board().count(Mark::X), 2);
        assert_eq!(game.phase(), Phase::InProgress);
    }

    #[test]
    fn test_resume_of_decided_board_finishes() {
        let snapshot = BoardSnapshot::from_bytes([b'O', b'O', b'O', b'X', b'X', 0, b'X', 0, 0]);
        let mut game = started();
        assert_eq!(
            game.handle(SLOT, Frame::resume(snapshot)),
            Directive::Finish(
                SessionMessage::game_over(SLOT),
                ReleaseReason::GameFinished(GameStatus::Won(Mark::O))
            )
        );
    }

    #[test]
    fn test_unbalanced_resume_is_violation() {
        let snapshot = BoardSnapshot::from_bytes([b'X', b'X', b'X', 0, 0, 0, 0, 0, 0]);
        let mut game = started();
        assert!(matches!(
            game.handle(SLOT, Frame::resume(snapshot)),
            Directive::Release(ReleaseReason::ProtocolViolation(Violation::Malformed(
                DecodeError::UnbalancedSnapshot { x: 3, o: 0 }
            )))
        ));
    }

    #[test]
    fn test_resume_with_server_ahead_is_violation() {
        let snapshot = BoardSnapshot::from_bytes([0, 0, 0, 0, b'X', 0, 0, 0, 0]);
        let mut game = started();
        assert_eq!(
            game.handle(SLOT, Frame::resume(snapshot)),
            Directive::Release(ReleaseReason::ProtocolViolation(Violation::OutOfTurn {
                x: 1,
                o: 0
            }))
        );
        assert!(game.board().count(Mark::X) <= 1);
    }

    #[test]
    fn test_move_after_server_win_is_violation() {
        // X to move with 1 and 2 held; the server completes the top row.
        let snapshot = BoardSnapshot::from_bytes([b'X', b'X', 0, b'O', b'O', 0, 0, 0, 0]);
        let mut game = started();
        assert_eq!(
            game.handle(SLOT, Frame::resume(snapshot)),
            Directive::Send(SessionMessage::move_to(Position::TopRight, SLOT))
        );
        assert_eq!(game.phase(), Phase::Concluded);
        assert_eq!(game.status(), GameStatus::Won(Mark::X));

        assert_eq!(
            game.handle(SLOT, peer_move(Position::MiddleRight)),
            Directive::Release(ReleaseReason::ProtocolViolation(
                Violation::UnexpectedCommand {
                    command: SessionCommand::Move,
                    phase: Phase::Concluded
                }
            ))
        );
    }

    #[test]
    fn test_second_new_game_is_violation() {
        let mut game = started();
        game.handle(SLOT, Frame::message(SessionMessage::new_game()));
        assert!(matches!(
            game.handle(SLOT, Frame::message(SessionMessage::new_game())),
            Directive::Release(ReleaseReason::ProtocolViolation(
                Violation::UnexpectedCommand {
                    command: SessionCommand::NewGame,
                    phase: Phase::InProgress
                }
            ))
        ));
    }

    #[test]
    fn test_full_game_against_search() {
        let mut game = started();
        let mut directive = game.handle(SLOT, Frame::message(SessionMessage::new_game()));

        loop {
            match directive {
                Directive::Send(reply) => {
                    assert_eq!(reply.command(), SessionCommand::Move);
                    if game.phase() == Phase::Concluded {
                        break;
                    }
                    let pos = best_move(game.board(), Mark::O).unwrap();
                    directive = game.handle(SLOT, peer_move(pos));
                }
                Directive::Finish(_, reason) => {
                    panic!("peer move should never end an optimal game: {reason}")
                }
                Directive::Release(reason) => panic!("unexpected release: {reason}"),
            }
        }

        assert_eq!(game.status(), GameStatus::Draw);
        assert_eq!(
            game.handle(SLOT, Frame::message(SessionMessage::game_over(SLOT))),
            Directive::Release(ReleaseReason::GameFinished(GameStatus::Draw))
        );
    }
}
