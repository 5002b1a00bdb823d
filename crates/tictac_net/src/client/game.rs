//! Client-side mirror of the session state machine.

use tictac_engine::{Board, GameStatus, Mark, Move, MoveError, Position, evaluate};
use tictac_protocol::{SessionCommand, SessionMessage, SlotNumber};
use tracing::{debug, instrument};

use crate::error::ClientViolation;

/// What the client does after a server message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientDirective {
    /// Choose and send a move.
    Play,
    /// The server's move decided the game: send GameOver, then stop.
    Conclude(GameStatus),
    /// The server ended the game; nothing more to send.
    Finish(GameStatus),
    /// The server broke the protocol: send GameOver, then stop with an error.
    Leave(ClientViolation),
}

/// The client's board and session slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientGame {
    board: Board,
    slot: Option<SlotNumber>,
}

impl Default for ClientGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientGame {
    /// The mark this side plays.
    pub const MARK: Mark = Mark::O;

    /// A fresh game with an empty board.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            slot: None,
        }
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Slot adopted from the server, if any move has arrived yet.
    pub fn slot(&self) -> Option<SlotNumber> {
        self.slot
    }

    /// Outcome according to the local board.
    pub fn status(&self) -> GameStatus {
        evaluate(&self.board)
    }

    /// Opening message for a new game.
    pub fn start_new(&mut self) -> SessionMessage {
        *self = Self::new();
        SessionMessage::new_game()
    }

    /// Forgets the slot before resuming on another server; the board stays.
    pub fn prepare_resume(&mut self) {
        self.slot = None;
    }

    /// GameOver for the current slot (or slot 0 before one is known).
    pub fn game_over(&self) -> SessionMessage {
        SessionMessage::game_over(self.slot.unwrap_or(SlotNumber::UNASSIGNED))
    }

    /// Applies one server message.
    #[instrument(skip_all, fields(%message))]
    pub fn handle(&mut self, message: &SessionMessage) -> ClientDirective {
        match message.command() {
            SessionCommand::Move => match self.server_move(message) {
                Ok(()) => match evaluate(&self.board) {
                    GameStatus::InProgress => ClientDirective::Play,
                    decided => ClientDirective::Conclude(decided),
                },
                Err(violation) => ClientDirective::Leave(violation),
            },
            SessionCommand::GameOver => ClientDirective::Finish(evaluate(&self.board)),
            command @ (SessionCommand::NewGame | SessionCommand::ResumeGame) => {
                ClientDirective::Leave(ClientViolation::UnexpectedCommand(command))
            }
        }
    }

    fn server_move(&mut self, message: &SessionMessage) -> Result<(), ClientViolation> {
        match self.slot {
            Some(expected) if expected != message.slot() => {
                return Err(ClientViolation::SlotMismatch {
                    expected,
                    found: message.slot(),
                });
            }
            Some(_) => {}
            None => {
                debug!(slot = %message.slot(), "Adopted session slot");
                self.slot = Some(message.slot());
            }
        }

        Move::from_digit(Mark::X, message.data())?.apply(&mut self.board)?;
        Ok(())
    }

    /// Plays this side's move and returns the message to send.
    pub fn play(&mut self, position: Position) -> Result<SessionMessage, MoveError> {
        Move::new(Self::MARK, position).apply(&mut self.board)?;
        Ok(SessionMessage::move_to(
            position,
            self.slot.unwrap_or(SlotNumber::UNASSIGNED),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_move(position: Position, slot: u8) -> SessionMessage {
        SessionMessage::move_to(position, SlotNumber::new(slot))
    }

    #[test]
    fn test_adopts_slot_from_first_move() {
        let mut game = ClientGame::new();
        game.start_new();
        assert_eq!(game.handle(&server_move(Position::TopLeft, 4)), ClientDirective::Play);
        assert_eq!(game.slot(), Some(SlotNumber::new(4)));

        let reply = game.play(Position::Center).unwrap();
        assert_eq!(reply, SessionMessage::move_to(Position::Center, SlotNumber::new(4)));
    }

    #[test]
    fn test_rejects_move_for_other_slot() {
        let mut game = ClientGame::new();
        game.handle(&server_move(Position::TopLeft, 4));
        game.play(Position::Center).unwrap();
        assert!(matches!(
            game.handle(&server_move(Position::TopRight, 5)),
            ClientDirective::Leave(ClientViolation::SlotMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_server_move_on_occupied_square() {
        let mut game = ClientGame::new();
        game.handle(&server_move(Position::TopLeft, 1));
        game.play(Position::Center).unwrap();
        assert!(matches!(
            game.handle(&server_move(Position::Center, 1)),
            ClientDirective::Leave(ClientViolation::IllegalMove(MoveError::SquareOccupied(_)))
        ));
    }

    #[test]
    fn test_unsolicited_new_game_means_leave() {
        let mut game = ClientGame::new();
        assert_eq!(
            game.handle(&SessionMessage::new_game()),
            ClientDirective::Leave(ClientViolation::UnexpectedCommand(SessionCommand::NewGame))
        );
        assert!(matches!(
            game.handle(&SessionMessage::resume_game()),
            ClientDirective::Leave(_)
        ));
    }

    #[test]
    fn test_winning_server_move_concludes() {
        let mut game = ClientGame::new();
        game.handle(&server_move(Position::TopLeft, 1));
        game.play(Position::MiddleLeft).unwrap();
        game.handle(&server_move(Position::TopCenter, 1));
        game.play(Position::Center).unwrap();
        assert_eq!(
            game.handle(&server_move(Position::TopRight, 1)),
            ClientDirective::Conclude(GameStatus::Won(Mark::X))
        );
        assert_eq!(game.game_over(), SessionMessage::game_over(SlotNumber::new(1)));
    }

    #[test]
    fn test_resume_keeps_board_and_drops_slot() {
        let mut game = ClientGame::new();
        game.handle(&server_move(Position::TopLeft, 3));
        game.play(Position::Center).unwrap();
        let board = game.board().clone();

        game.prepare_resume();
        assert_eq!(game.slot(), None);
        assert_eq!(game.board(), &board);
        assert_eq!(game.handle(&server_move(Position::TopRight, 7)), ClientDirective::Play);
        assert_eq!(game.slot(), Some(SlotNumber::new(7)));
    }
}
