//! Pixel rectangle encoding and decoding.
//!
//! Both planes store pixels as 4 little-endian f32 channels (RGBA). Decoding
//! is a pure transform from a byte slice the caller already read out of the
//! region; it never touches the region itself and never blocks. Length
//! mismatches mean the two sides disagree on layout and are fatal.

use crate::error::ProtocolError;
use crate::layout::{TileGeometry, BYTES_PER_PIXEL};

/// A decoded rectangle of RGBA f32 pixels with its on-screen placement.
///
/// `pixels` is row-major, `width * height` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl PixelRect {
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Decode one tile's payload bytes (already cropped and clamped per `geom`).
pub fn decode_tile(payload: &[u8], geom: &TileGeometry) -> Result<PixelRect, ProtocolError> {
    let pixels = decode_pixels(payload, geom.width, geom.height)?;
    Ok(PixelRect {
        x: geom.x,
        y: geom.y,
        width: geom.width,
        height: geom.height,
        pixels,
    })
}

/// Decode the secondary plane's full frame, placed at the origin.
///
/// The secondary plane is addressed by absolute pixel position, so no tiling
/// or cropping logic applies here.
pub fn decode_full_frame(
    payload: &[u8],
    width: u32,
    height: u32,
) -> Result<PixelRect, ProtocolError> {
    let pixels = decode_pixels(payload, width, height)?;
    Ok(PixelRect {
        x: 0,
        y: 0,
        width,
        height,
        pixels,
    })
}

/// Encode pixels into the wire format. Exact inverse of decoding; used by
/// in-process producers and tests.
pub fn encode_pixels(pixels: &[[f32; 4]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * BYTES_PER_PIXEL);
    for px in pixels {
        for channel in px {
            out.extend_from_slice(&channel.to_le_bytes());
        }
    }
    out
}

fn decode_pixels(payload: &[u8], width: u32, height: u32) -> Result<Vec<[f32; 4]>, ProtocolError> {
    let count = width as usize * height as usize;
    let expected = count * BYTES_PER_PIXEL;
    if payload.len() != expected {
        return Err(ProtocolError::PayloadLenMismatch {
            expected,
            actual: payload.len(),
        });
    }

    let mut pixels = Vec::with_capacity(count);
    for chunk in payload.chunks_exact(BYTES_PER_PIXEL) {
        let mut px = [0.0f32; 4];
        for (channel, bytes) in px.iter_mut().zip(chunk.chunks_exact(4)) {
            *channel = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        pixels.push(px);
    }
    Ok(pixels)
}
