//! Small shared protocol types.

/// One-byte session slot number (1-based, stable for a roster slot's life).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
#[display("{_0}")]
pub struct SlotNumber(u8);

impl SlotNumber {
    /// Slot byte sent where the slot is not yet known (NewGame, ResumeGame).
    pub const UNASSIGNED: SlotNumber = SlotNumber(0);

    /// Wraps a raw slot byte.
    pub const fn new(n: u8) -> Self {
        Self(n)
    }

    /// Raw byte for the wire.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based roster index, if this is a real slot.
    pub fn index(self) -> Option<usize> {
        usize::from(self.0).checked_sub(1)
    }
}
