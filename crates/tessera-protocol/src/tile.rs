//! Per-tile handoff state, one byte per tile in the header bitmap.
//!
//! The byte is a one-way state machine split across the two processes:
//! the producer performs the only `Pending -> Ready` transition (after all of
//! the tile's pixel bytes are written), and the consumer performs the only
//! `Ready -> Displayed` transition. Nothing ever writes a byte back to a
//! lower state, which is what makes the region safe without locks.

/// Producer has not finished writing this tile yet.
pub const TILE_PENDING: u8 = 0;

/// Producer finished the tile; consumer has not displayed it.
pub const TILE_READY: u8 = 1;

/// Consumer displayed the tile. Values above 2 decode the same way so a
/// defensive re-mark stays a no-op on the wire.
pub const TILE_DISPLAYED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    Pending,
    Ready,
    Displayed,
}

impl TileStatus {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            TILE_PENDING => Self::Pending,
            TILE_READY => Self::Ready,
            _ => Self::Displayed,
        }
    }

    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}
