//! Host side of the tessera preview bridge.
//!
//! The host spawns an offline renderer as a subprocess and drains its
//! progressive output from a shared byte region into a display sink:
//!
//! 1. [`RenderBridge::render`] allocates the region, spawns the renderer and
//!    starts the periodic update loop.
//! 2. The update loop ([`update::UpdateLoop`]) ticks a [`consume::TileConsumer`]:
//!    scan the header bitmap, decode each ready tile, push it to the
//!    [`sink::DisplaySink`], advance the tile's handoff byte.
//! 3. A supervisor poll loop ([`supervisor::RendererProcess`]) watches the
//!    subprocess, relays the region's progress byte and handles cooperative
//!    cancellation with a bounded kill grace.
//! 4. On subprocess exit the loop is stopped and joined, one final synchronous
//!    tick runs, and if the producer set the final-update flag the full
//!    secondary plane supersedes all partial tiles. The region is then
//!    released whatever happened.
//!
//! Synchronization with the producer is the one-way per-tile byte state
//! machine defined in `tessera-protocol`; there are no locks over the region.

pub mod config;
pub mod consume;
pub mod job;
pub mod lifecycle;
pub mod sink;
pub mod supervisor;
pub mod update;

mod error;

pub use config::{JobConfig, RendererConfig};
pub use consume::TileConsumer;
pub use error::BridgeError;
pub use job::{JobPhase, RenderJob};
pub use lifecycle::RenderBridge;
pub use sink::{DisplaySink, RenderHost};
