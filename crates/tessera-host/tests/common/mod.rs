#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tessera_host::{DisplaySink, RenderHost};
use tessera_protocol::{encode_pixels, PixelRect, RegionLayout};
use tessera_region::RegionStore;

/// Sink that records every pushed rectangle and checks begin/write/end
/// pairing.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub rects: Vec<PixelRect>,
    next_token: u64,
}

pub struct Token {
    id: u64,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    rect: Option<PixelRect>,
}

impl DisplaySink for CollectSink {
    type Token = Token;

    fn begin_partial_result(&mut self, x: u32, y: u32, width: u32, height: u32) -> Token {
        self.next_token += 1;
        Token {
            id: self.next_token,
            x,
            y,
            width,
            height,
            rect: None,
        }
    }

    fn write_rect(&mut self, token: &mut Token, rect: &PixelRect) {
        assert_eq!(
            (token.x, token.y, token.width, token.height),
            (rect.x, rect.y, rect.width, rect.height),
            "rect must match the begun result"
        );
        assert!(token.rect.is_none(), "write_rect called twice for token {}", token.id);
        token.rect = Some(rect.clone());
    }

    fn end_partial_result(&mut self, token: Token) {
        let rect = token
            .rect
            .unwrap_or_else(|| panic!("end without write for token {}", token.id));
        self.rects.push(rect);
    }
}

/// Host double recording progress/error callbacks, with a settable break
/// flag.
#[derive(Default)]
pub struct RecordingHost {
    pub progress: Mutex<Vec<f32>>,
    pub errors: Mutex<Vec<String>>,
    cancel: AtomicBool,
}

impl RecordingHost {
    pub fn request_break(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

impl RenderHost for RecordingHost {
    fn report_progress(&self, fraction: f32) {
        self.progress.lock().unwrap().push(fraction);
    }

    fn report_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_owned());
    }

    fn break_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// Producer-side helper: write one tile's pixels and mark it ready, the way
/// the renderer does (all pixel bytes first, then the handoff byte).
pub fn produce_tile<R: RegionStore>(
    region: &R,
    layout: &RegionLayout,
    index: usize,
    pixels: &[[f32; 4]],
) {
    let geom = layout.tile_geometry(index).expect("tile index");
    assert_eq!(pixels.len(), (geom.width * geom.height) as usize);
    let (offset, len) = layout.tile_payload(&geom).expect("tile payload");
    let bytes = encode_pixels(pixels);
    assert_eq!(bytes.len(), len);
    region.write_at(offset as u64, &bytes).expect("write tile pixels");
    region.write_byte(index as u64, 1).expect("mark tile ready");
}

/// A recognisable per-tile fill value.
pub fn tile_fill(index: usize) -> [f32; 4] {
    let base = index as f32;
    [base + 0.25, base + 0.5, -base, 1.0]
}

pub fn tile_pixels(layout: &RegionLayout, index: usize) -> Vec<[f32; 4]> {
    let geom = layout.tile_geometry(index).expect("tile index");
    vec![tile_fill(index); (geom.width * geom.height) as usize]
}

/// Producer-side helper: write the full-frame secondary plane and set the
/// final-update flag (plane first, flag last, per the protocol contract).
pub fn produce_final_frame<R: RegionStore>(
    region: &R,
    layout: &RegionLayout,
    pixels: &[[f32; 4]],
) {
    assert_eq!(pixels.len(), (layout.width * layout.height) as usize);
    region
        .write_at(layout.full_plane_offset() as u64, &encode_pixels(pixels))
        .expect("write full plane");
    region
        .write_byte(layout.final_flag_offset() as u64, 1)
        .expect("set final flag");
}

#[cfg(unix)]
pub fn write_script(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}
