//! Consumer side of the tile handoff: scan, decode, push, advance.

use tessera_protocol::{
    decode_full_frame, decode_tile, scan_ready_tiles, ProtocolError, RegionLayout,
    tile::TILE_DISPLAYED,
};
use tessera_region::RegionStore;
use tracing::{debug, trace};

use crate::error::BridgeError;
use crate::sink::DisplaySink;

/// Drains completed tiles from a shared region into a display sink.
///
/// One consumer owns one region handle and one sink for the lifetime of a
/// job; ticks are driven externally (periodically by the update loop, then
/// one last time synchronously after the producer exits).
#[derive(Debug)]
pub struct TileConsumer<R, S> {
    region: R,
    layout: RegionLayout,
    sink: S,
}

impl<R: RegionStore, S: DisplaySink> TileConsumer<R, S> {
    /// Binds a region handle to the layout, verifying the region is exactly
    /// the size the layout demands. A mismatch means the producer computed a
    /// different layout and nothing in the region can be trusted.
    pub fn new(region: R, layout: RegionLayout, sink: S) -> Result<Self, BridgeError> {
        if region.len() != layout.total_bytes as u64 {
            return Err(ProtocolError::RegionSizeMismatch {
                expected: layout.total_bytes,
                actual: region.len(),
            }
            .into());
        }
        Ok(Self {
            region,
            layout,
            sink,
        })
    }

    /// One update tick: push every tile whose handoff byte is `Ready` and
    /// advance it to `Displayed` so later ticks skip it. Returns the number
    /// of tiles pushed.
    ///
    /// Tiles still `Pending` are never decoded; the next tick re-observes
    /// them, so there is no per-tile retry logic.
    pub fn consume_ready_tiles(&mut self) -> Result<usize, BridgeError> {
        let mut bitmap = vec![0u8; self.layout.header_bytes];
        self.region.read_at(0, &mut bitmap)?;

        let ready = scan_ready_tiles(&bitmap);
        for &index in &ready {
            let geom = self.layout.tile_geometry(index)?;
            let (offset, len) = self.layout.tile_payload(&geom)?;

            let mut payload = vec![0u8; len];
            self.region.read_at(offset as u64, &mut payload)?;
            let rect = decode_tile(&payload, &geom)?;

            trace!(
                index,
                x = rect.x,
                y = rect.y,
                w = rect.width,
                h = rect.height,
                "pushing tile"
            );
            let mut token = self
                .sink
                .begin_partial_result(rect.x, rect.y, rect.width, rect.height);
            self.sink.write_rect(&mut token, &rect);
            self.sink.end_partial_result(token);

            // Consumer-side half of the handoff; the producer never writes
            // a byte that is already Ready, so this cannot race with it.
            self.region.write_byte(index as u64, TILE_DISPLAYED)?;
        }

        if !ready.is_empty() {
            debug!(tiles = ready.len(), "update tick consumed tiles");
        }
        Ok(ready.len())
    }

    /// If the producer set the final-update flag, push the full secondary
    /// plane as one rect that supersedes every partial tile. Returns whether
    /// a final frame was pushed.
    ///
    /// A set flag is a strict producer contract: the secondary plane must be
    /// complete before the flag byte is written. The host does not try to
    /// detect or repair a torn final frame.
    pub fn drain_final_frame(&mut self) -> Result<bool, BridgeError> {
        let flag = self
            .region
            .read_byte(self.layout.final_flag_offset() as u64)?;
        if flag == 0 {
            return Ok(false);
        }

        let mut payload = vec![0u8; self.layout.full_frame_bytes()];
        self.region
            .read_at(self.layout.full_plane_offset() as u64, &mut payload)?;
        let rect = decode_full_frame(&payload, self.layout.width, self.layout.height)?;

        debug!(w = rect.width, h = rect.height, "pushing final full frame");
        let mut token = self
            .sink
            .begin_partial_result(0, 0, rect.width, rect.height);
        self.sink.write_rect(&mut token, &rect);
        self.sink.end_partial_result(token);
        Ok(true)
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    /// Hands the sink back once the job is over.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Reads the producer's progress byte, clamped to `0.0..=1.0`.
pub fn read_progress<R: RegionStore>(
    region: &R,
    layout: &RegionLayout,
) -> Result<f32, BridgeError> {
    let byte = region.read_byte(layout.progress_offset() as u64)?;
    Ok(f32::from(byte.min(100)) / 100.0)
}
