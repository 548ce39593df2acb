//! Shared-region wire contract for the tessera preview bridge.
//!
//! A host application and an offline renderer subprocess exchange progressive
//! render results through one contiguous shared byte region. This crate is the
//! single source of truth for that region's layout and encoding; it performs
//! no I/O and holds no process state, so both sides of the process boundary
//! can (and must) link the same definitions. Any disagreement between the two
//! sides is a fatal protocol error, never something to paper over at runtime.
//!
//! Modules:
//! - [`layout`]: region byte map and per-tile geometry arithmetic
//! - [`tile`]: the one-byte-per-tile producer/consumer handoff state
//! - [`scan`]: dirty-tile scanning over the header bitmap
//! - [`frame`]: pixel rectangle encoding/decoding (RGBA f32, little-endian)

#![forbid(unsafe_code)]

pub mod frame;
pub mod layout;
pub mod scan;
pub mod tile;

mod error;

pub use error::ProtocolError;
pub use frame::{decode_full_frame, decode_tile, encode_pixels, PixelRect};
pub use layout::{RegionLayout, TileGeometry, BYTES_PER_PIXEL, TILE_SIZE};
pub use scan::scan_ready_tiles;
pub use tile::TileStatus;
