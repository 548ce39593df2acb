//! Shared memory layout contract for the tessera preview bridge.
//!
//! The renderer subprocess (producer) and the host display thread (consumer)
//! map the same byte region and derive every offset below independently. The
//! layout is fixed for the lifetime of a render:
//!
//! ```text
//! [0 .. H)        header bitmap, one byte per tile (H = tile_count_x * tile_count_y)
//! [H .. H+S)      primary plane, tile-major, row-major inside a tile (S = H * tile_bytes)
//! [H+S .. H+2S)   secondary plane, full frame addressed by absolute pixel position
//! [H+2S]          progress byte, 0..=100
//! [H+2S+1]        final-update-ready flag, 0/1
//! ```
//!
//! Pixels are 4 little-endian IEEE-754 f32 channels (RGBA), 16 bytes, in both
//! planes. Each primary-plane tile slot is reserved at the full
//! `tile_size^2 * 16` bytes even for clamped edge tiles.

use crate::error::ProtocolError;

/// Edge length of a full tile, in pixels. Fixed by the protocol.
pub const TILE_SIZE: u32 = 64;

/// RGBA, 4 channels of f32.
pub const BYTES_PER_PIXEL: usize = 16;

/// Region geometry shared by producer and consumer.
///
/// Computed identically on both sides of the process boundary; a mismatch is
/// a fatal protocol error, which is why all derived offsets live here rather
/// than as ad hoc arithmetic at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub tile_count_x: u32,
    pub tile_count_y: u32,
    /// One byte per tile: `tile_count_x * tile_count_y`.
    pub header_bytes: usize,
    /// Reserved bytes per tile slot: `tile_size^2 * 16`.
    pub tile_bytes: usize,
    /// Bytes per image plane: `header_bytes * tile_bytes`.
    pub plane_bytes: usize,
    /// `2 * plane_bytes + header_bytes + 2`.
    pub total_bytes: usize,
}

impl RegionLayout {
    pub fn compute(width: u32, height: u32, tile_size: u32) -> Result<Self, ProtocolError> {
        if width == 0 || height == 0 {
            return Err(ProtocolError::EmptyImage { width, height });
        }
        if tile_size == 0 {
            return Err(ProtocolError::ZeroTileSize);
        }

        let tile_count_x = width.div_ceil(tile_size);
        let tile_count_y = height.div_ceil(tile_size);

        let header_bytes = (tile_count_x as usize)
            .checked_mul(tile_count_y as usize)
            .ok_or(ProtocolError::LayoutOverflow)?;
        let tile_bytes = (tile_size as usize)
            .checked_mul(tile_size as usize)
            .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
            .ok_or(ProtocolError::LayoutOverflow)?;
        let plane_bytes = header_bytes
            .checked_mul(tile_bytes)
            .ok_or(ProtocolError::LayoutOverflow)?;
        let total_bytes = plane_bytes
            .checked_mul(2)
            .and_then(|n| n.checked_add(header_bytes))
            .and_then(|n| n.checked_add(2))
            .ok_or(ProtocolError::LayoutOverflow)?;

        Ok(Self {
            width,
            height,
            tile_size,
            tile_count_x,
            tile_count_y,
            header_bytes,
            tile_bytes,
            plane_bytes,
            total_bytes,
        })
    }

    pub fn tile_count(&self) -> usize {
        self.header_bytes
    }

    /// Byte offset of tile `index`'s slot in the primary plane.
    pub fn tile_data_offset(&self, index: usize) -> Result<usize, ProtocolError> {
        if index >= self.tile_count() {
            return Err(ProtocolError::TileIndexOutOfRange {
                index,
                tile_count: self.tile_count(),
            });
        }
        Ok(self.header_bytes + index * self.tile_bytes)
    }

    /// Byte offset of the secondary (full-frame) plane.
    pub fn full_plane_offset(&self) -> usize {
        self.header_bytes + self.plane_bytes
    }

    /// Length of the full frame in the secondary plane: `width * height * 16`.
    ///
    /// Smaller than `plane_bytes` whenever an image dimension is ragged; the
    /// remainder of the plane reservation is never read.
    pub fn full_frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    pub fn progress_offset(&self) -> usize {
        self.header_bytes + 2 * self.plane_bytes
    }

    pub fn final_flag_offset(&self) -> usize {
        self.progress_offset() + 1
    }

    /// Rows cropped off the first tile row when the image height is not a
    /// tile-size multiple: `tile_size - height % tile_size`, 0 when exact.
    ///
    /// The producer aligns the image to the *bottom* of the tile grid, so the
    /// crop always falls on tiles at `tile_y == 0`.
    pub fn row_crop(&self) -> u32 {
        let rem = self.height % self.tile_size;
        if rem == 0 {
            0
        } else {
            self.tile_size - rem
        }
    }

    /// On-screen placement and clamped extent of tile `index`.
    pub fn tile_geometry(&self, index: usize) -> Result<TileGeometry, ProtocolError> {
        if index >= self.tile_count() {
            return Err(ProtocolError::TileIndexOutOfRange {
                index,
                tile_count: self.tile_count(),
            });
        }

        let tile_x = index as u32 % self.tile_count_x;
        let tile_y = index as u32 / self.tile_count_x;

        let grid_x = tile_x * self.tile_size;
        let grid_y = tile_y * self.tile_size;

        // Rightmost column may be narrower than a full tile; this shrinks the
        // row stride inside the slot, not the row count.
        let width = self.tile_size.min(self.width - grid_x);

        let cropped_rows = self.row_crop().saturating_sub(grid_y);
        let height = self.tile_size - cropped_rows;

        Ok(TileGeometry {
            index,
            tile_x,
            tile_y,
            x: grid_x,
            y: grid_y.saturating_sub(self.row_crop()),
            width,
            height,
            cropped_rows,
        })
    }

    /// Byte range of tile `index`'s readable payload in the primary plane:
    /// the slot offset advanced past the cropped rows, and exactly
    /// `width * height` pixels long.
    pub fn tile_payload(&self, geom: &TileGeometry) -> Result<(usize, usize), ProtocolError> {
        let slot = self.tile_data_offset(geom.index)?;
        let skip = geom.cropped_rows as usize * geom.width as usize * BYTES_PER_PIXEL;
        let len = geom.width as usize * geom.height as usize * BYTES_PER_PIXEL;
        Ok((slot + skip, len))
    }
}

/// Placement of one tile's decoded rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    pub index: usize,
    pub tile_x: u32,
    pub tile_y: u32,
    /// On-screen x of the decoded rectangle.
    pub x: u32,
    /// On-screen y of the decoded rectangle (already adjusted for row crop).
    pub y: u32,
    /// Decoded width, clamped to the image's right edge.
    pub width: u32,
    /// Decoded height, shrunk by `cropped_rows`.
    pub height: u32,
    /// Rows skipped at the start of the tile slot.
    pub cropped_rows: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_is_header_times_tile_bytes() {
        for (w, h) in [(1920, 1080), (100, 100), (64, 64), (65, 1), (1, 65)] {
            let layout = RegionLayout::compute(w, h, TILE_SIZE).unwrap();
            assert_eq!(layout.plane_bytes, layout.header_bytes * layout.tile_bytes);
            assert_eq!(
                layout.total_bytes,
                2 * layout.plane_bytes + layout.header_bytes + 2
            );
            assert_eq!(layout.progress_offset(), layout.header_bytes + 2 * layout.plane_bytes);
            assert_eq!(layout.final_flag_offset(), layout.total_bytes - 1);
        }
    }

    #[test]
    fn exact_multiples_have_no_row_crop() {
        let layout = RegionLayout::compute(128, 128, 64).unwrap();
        assert_eq!(layout.row_crop(), 0);
        let geom = layout.tile_geometry(0).unwrap();
        assert_eq!((geom.width, geom.height, geom.cropped_rows), (64, 64, 0));
    }

    #[test]
    fn ragged_height_crops_first_tile_row_only() {
        // 100 % 64 = 36, so 28 rows fall above the image top.
        let layout = RegionLayout::compute(128, 100, 64).unwrap();
        assert_eq!(layout.row_crop(), 28);
        assert_eq!((layout.tile_count_x, layout.tile_count_y), (2, 2));

        let top = layout.tile_geometry(0).unwrap();
        assert_eq!(top.cropped_rows, 28);
        assert_eq!(top.height, 36);
        assert_eq!(top.y, 0);

        let below = layout.tile_geometry(2).unwrap();
        assert_eq!(below.cropped_rows, 0);
        assert_eq!(below.height, 64);
        assert_eq!(below.y, 36);

        // Heights tile the image exactly.
        assert_eq!(top.height + below.height, layout.height);
    }

    #[test]
    fn ragged_width_narrows_rightmost_column() {
        let layout = RegionLayout::compute(100, 128, 64).unwrap();
        let right = layout.tile_geometry(1).unwrap();
        assert_eq!(right.width, 36);
        assert_eq!(right.x, 64);

        let left = layout.tile_geometry(0).unwrap();
        assert_eq!(left.width, 64);
    }

    #[test]
    fn tile_payload_skips_cropped_rows() {
        let layout = RegionLayout::compute(128, 100, 64).unwrap();
        let geom = layout.tile_geometry(0).unwrap();
        let (offset, len) = layout.tile_payload(&geom).unwrap();
        assert_eq!(offset, layout.header_bytes + 28 * 64 * BYTES_PER_PIXEL);
        assert_eq!(len, 64 * 36 * BYTES_PER_PIXEL);

        // Uncropped tiles read from the slot start.
        let geom = layout.tile_geometry(2).unwrap();
        let (offset, len) = layout.tile_payload(&geom).unwrap();
        assert_eq!(offset, layout.header_bytes + 2 * layout.tile_bytes);
        assert_eq!(len, layout.tile_bytes);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let layout = RegionLayout::compute(128, 128, 64).unwrap();
        assert!(matches!(
            layout.tile_geometry(4),
            Err(ProtocolError::TileIndexOutOfRange { index: 4, tile_count: 4 })
        ));
        assert!(layout.tile_data_offset(3).is_ok());
    }

    #[test]
    fn degenerate_dimensions_are_rejected() {
        assert!(matches!(
            RegionLayout::compute(0, 64, 64),
            Err(ProtocolError::EmptyImage { .. })
        ));
        assert!(matches!(
            RegionLayout::compute(64, 64, 0),
            Err(ProtocolError::ZeroTileSize)
        ));
    }
}
