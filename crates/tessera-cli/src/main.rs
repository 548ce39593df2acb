//! Native harness for the tessera preview bridge.
//!
//! Drives a real renderer binary against an already-exported scene file and
//! accumulates every partial/final update into an offscreen frame, written
//! out as a PNG on exit. Useful for debugging the shared-region protocol
//! without a host GUI in the loop.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tessera_host::{
    DisplaySink, JobConfig, RenderBridge, RenderHost, RendererConfig,
};
use tessera_protocol::PixelRect;

#[derive(Debug, Parser)]
#[command(about = "Run a renderer against the tessera shared-region protocol")]
struct Args {
    /// Renderer binary to spawn.
    #[arg(long)]
    renderer: PathBuf,

    /// Working directory for the renderer (defaults to the binary's parent).
    #[arg(long)]
    renderer_dir: Option<PathBuf>,

    /// Exported scene description handed to the renderer as its first
    /// argument.
    #[arg(long)]
    scene: PathBuf,

    /// Mode flag handed to the renderer as its second argument.
    #[arg(long, default_value = "preview")]
    mode_flag: String,

    /// Output resolution.
    #[arg(long)]
    width: u32,
    #[arg(long)]
    height: u32,

    /// Directory for the shared region file (defaults to the OS temp dir).
    #[arg(long)]
    region_dir: Option<PathBuf>,

    /// Update loop period in milliseconds.
    #[arg(long, default_value_t = 1000)]
    update_period_ms: u64,

    /// Where to write the accumulated frame as PNG.
    #[arg(long)]
    out: PathBuf,
}

/// Accumulates pushed rectangles into one full frame.
struct FrameSink {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl FrameSink {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }
}

impl DisplaySink for FrameSink {
    type Token = (u32, u32);

    fn begin_partial_result(&mut self, x: u32, y: u32, _width: u32, _height: u32) -> (u32, u32) {
        (x, y)
    }

    fn write_rect(&mut self, token: &mut (u32, u32), rect: &PixelRect) {
        let (x0, y0) = *token;
        for row in 0..rect.height.min(self.height.saturating_sub(y0)) {
            let src = (row * rect.width) as usize;
            let dst = ((y0 + row) * self.width + x0) as usize;
            let cols = rect.width.min(self.width.saturating_sub(x0)) as usize;
            self.pixels[dst..dst + cols].copy_from_slice(&rect.pixels[src..src + cols]);
        }
    }

    fn end_partial_result(&mut self, _token: (u32, u32)) {}
}

/// Logs progress changes; no interactive cancellation in the harness.
struct CliHost {
    last_percent: AtomicU8,
}

impl RenderHost for CliHost {
    fn report_progress(&self, fraction: f32) {
        let percent = (fraction * 100.0) as u8;
        if self.last_percent.swap(percent, Ordering::Relaxed) != percent {
            tracing::info!(percent, "render progress");
        }
    }

    fn report_error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let working_dir = match &args.renderer_dir {
        Some(dir) => dir.clone(),
        None => args
            .renderer
            .parent()
            .ok_or_else(|| anyhow!("cannot derive a working dir from {}", args.renderer.display()))?
            .to_path_buf(),
    };
    let mut renderer = RendererConfig::new(&args.renderer, working_dir);
    renderer.mode_flag = args.mode_flag.clone();

    let region_dir = args
        .region_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let mut job = JobConfig::new(args.width, args.height, &args.scene, region_dir);
    job.update_period = Duration::from_millis(args.update_period_ms);

    let mut bridge = RenderBridge::new(renderer);
    let host = CliHost {
        last_percent: AtomicU8::new(0),
    };
    let sink = bridge
        .render(&job, FrameSink::new(args.width, args.height), &host)
        .context("render job failed")?;

    save_png(&sink, &args.out)?;
    tracing::info!(out = %args.out.display(), "frame written");
    Ok(())
}

fn save_png(sink: &FrameSink, path: &PathBuf) -> Result<()> {
    let mut rgba = Vec::with_capacity(sink.pixels.len() * 4);
    // Display rows are bottom-up (origin at the bottom-left); PNG rows are
    // top-down.
    for row in (0..sink.height).rev() {
        let start = (row * sink.width) as usize;
        for px in &sink.pixels[start..start + sink.width as usize] {
            for channel in px {
                rgba.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
    }

    let img = image::RgbaImage::from_raw(sink.width, sink.height, rgba)
        .ok_or_else(|| anyhow!("invalid frame buffer dimensions"))?;
    img.save(path)
        .with_context(|| format!("failed to write PNG: {}", path.display()))?;
    Ok(())
}
