//! Fixed-capacity roster of session slots.
//!
//! Slots are created once and never reallocated. Binding a connection
//! fills the lowest free slot; releasing drops the handle and resets the
//! slot's game in place, so slot numbers stay stable.

use tictac_protocol::{FrameAssembler, SlotNumber};
use tracing::{debug, instrument};

use super::session::SessionGame;

/// One roster entry.
#[derive(Debug)]
pub struct Slot<T> {
    number: SlotNumber,
    handle: Option<T>,
    game: SessionGame,
    frames: FrameAssembler,
}

impl<T> Slot<T> {
    fn new(number: SlotNumber) -> Self {
        Self {
            number,
            handle: None,
            game: SessionGame::new(),
            frames: FrameAssembler::new(),
        }
    }

    /// Stable slot number (1-based).
    pub fn number(&self) -> SlotNumber {
        self.number
    }

    /// Whether a connection is bound.
    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// The bound connection.
    pub fn handle(&self) -> Option<&T> {
        self.handle.as_ref()
    }

    /// The bound connection, mutably.
    pub fn handle_mut(&mut self) -> Option<&mut T> {
        self.handle.as_mut()
    }

    /// The slot's game.
    pub fn game(&self) -> &SessionGame {
        &self.game
    }

    /// The slot's game, mutably.
    pub fn game_mut(&mut self) -> &mut SessionGame {
        &mut self.game
    }

    /// Bytes received but not yet forming a whole frame.
    pub fn frames_mut(&mut self) -> &mut FrameAssembler {
        &mut self.frames
    }

    fn release(&mut self) -> Option<T> {
        self.game.reset();
        self.frames.clear();
        self.handle.take()
    }
}

/// Fixed set of session slots.
#[derive(Debug)]
pub struct Roster<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Roster<T> {
    /// Creates `capacity` empty slots numbered 1..=capacity.
    pub fn new(capacity: u8) -> Self {
        Self {
            slots: (1..=capacity).map(|n| Slot::new(SlotNumber::new(n))).collect(),
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots with a bound connection.
    pub fn bound(&self) -> usize {
        self.slots.iter().filter(|s| s.is_bound()).count()
    }

    /// Whether a new connection could be bound right now.
    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(|s| !s.is_bound())
    }

    /// Binds `handle` into the lowest free slot.
    ///
    /// Hands the connection back when the roster is full.
    #[instrument(level = "debug", skip_all)]
    pub fn bind(&mut self, handle: T) -> Result<SlotNumber, T> {
        let Some(slot) = self.slots.iter_mut().find(|s| !s.is_bound()) else {
            return Err(handle);
        };
        slot.handle = Some(handle);
        slot.game.start();
        debug!(slot = %slot.number, "Slot bound");
        Ok(slot.number)
    }

    /// Looks up a slot by number.
    pub fn get(&self, number: SlotNumber) -> Option<&Slot<T>> {
        number.index().and_then(|i| self.slots.get(i))
    }

    /// Looks up a slot by number, mutably.
    pub fn get_mut(&mut self, number: SlotNumber) -> Option<&mut Slot<T>> {
        number.index().and_then(|i| self.slots.get_mut(i))
    }

    /// Unbinds a slot, resetting its game. Returns the old connection.
    pub fn release(&mut self, number: SlotNumber) -> Option<T> {
        self.get_mut(number).and_then(Slot::release)
    }

    /// Bound slots with their connections, in slot order.
    pub fn bound_handles(&self) -> impl Iterator<Item = (SlotNumber, &T)> {
        self.slots
            .iter()
            .filter_map(|s| s.handle.as_ref().map(|h| (s.number, h)))
    }
}
