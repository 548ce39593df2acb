//! Dirty-tile scanning over the header bitmap.

use crate::tile::TileStatus;

/// Indices of tiles whose bitmap byte is exactly `Ready`, in ascending
/// (row-major) order.
///
/// Read-only by contract: advancing consumed entries to `Displayed` is the
/// consumer's job after a successful decode, so a scan can always be retried
/// on the next tick. O(bitmap length), called once per update tick.
pub fn scan_ready_tiles(bitmap: &[u8]) -> Vec<usize> {
    bitmap
        .iter()
        .enumerate()
        .filter(|(_, &byte)| TileStatus::from_byte(byte).is_ready())
        .map(|(index, _)| index)
        .collect()
}
