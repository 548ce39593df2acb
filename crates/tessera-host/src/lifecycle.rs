//! Render job lifecycle coordination.
//!
//! Owns region creation/teardown and the startup order: validate config,
//! allocate the region, spawn the renderer, start the update loop, poll until
//! the subprocess exits (or cancellation kills it), drain the final frame,
//! release the region. Exactly one job occupies the non-idle phases at a
//! time.

use std::thread;
use std::time::Instant;

use tessera_protocol::RegionLayout;
use tessera_region::{region_path, SharedRegion};
use tracing::{debug, info, warn};

use crate::config::{JobConfig, RendererConfig};
use crate::consume::{read_progress, TileConsumer};
use crate::error::BridgeError;
use crate::job::{JobPhase, RenderJob};
use crate::sink::{DisplaySink, RenderHost};
use crate::supervisor::{ProcessState, RendererProcess};
use crate::update::UpdateLoop;

pub struct RenderBridge {
    renderer: RendererConfig,
    phase: JobPhase,
}

impl RenderBridge {
    pub fn new(renderer: RendererConfig) -> Self {
        Self {
            renderer,
            phase: JobPhase::Idle,
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    /// Run one render job to completion, blocking until the renderer exits
    /// (or is cancelled) and the final frame is drained. Returns the sink so
    /// the caller can inspect what was displayed.
    ///
    /// Every error is also surfaced through `host.report_error`, and the
    /// region is released on all paths that allocated one.
    pub fn render<S, H>(&mut self, job: &JobConfig, sink: S, host: &H) -> Result<S, BridgeError>
    where
        S: DisplaySink + 'static,
        H: RenderHost,
    {
        let result = self.render_inner(job, sink, host);
        self.phase = JobPhase::Idle;
        if let Err(err) = &result {
            host.report_error(&err.to_string());
        }
        result
    }

    fn render_inner<S, H>(&mut self, job: &JobConfig, sink: S, host: &H) -> Result<S, BridgeError>
    where
        S: DisplaySink + 'static,
        H: RenderHost,
    {
        if self.phase != JobPhase::Idle {
            return Err(BridgeError::config("a render job is already active"));
        }

        // Validation happens before any allocation so configuration mistakes
        // never leave a region file behind.
        if !self.renderer.binary.is_file() {
            return Err(BridgeError::config(format!(
                "renderer binary not found: {}",
                self.renderer.binary.display()
            )));
        }
        if !job.scene_file.is_file() {
            return Err(BridgeError::config(format!(
                "exported scene file not found: {}",
                job.scene_file.display()
            )));
        }
        let layout = RegionLayout::compute(job.width, job.height, job.tile_size)?;

        self.phase = JobPhase::Allocating;
        let path = region_path(&job.region_dir);
        let region = SharedRegion::create(&path, layout.total_bytes as u64)?;
        info!(
            region = %path.display(),
            bytes = layout.total_bytes,
            tiles = layout.tile_count(),
            "shared region allocated"
        );

        let process = match RendererProcess::spawn(&self.renderer, &job.scene_file) {
            Ok(process) => process,
            Err(err) => {
                if let Err(release_err) = region.release() {
                    warn!("failed to release region after launch failure: {release_err}");
                }
                return Err(err);
            }
        };

        let mut render_job = RenderJob {
            layout,
            scene_file: job.scene_file.clone(),
            region,
            process,
        };

        self.phase = JobPhase::Running;
        info!(pid = render_job.process.id(), "render job running");
        let result = self.run_to_drained(&mut render_job, job, sink, host);

        self.phase = JobPhase::Released;
        // Dropping the process handle reaps (and if needed kills) the child
        // on error paths; the region is unlinked whatever happened above.
        let RenderJob {
            region, process, ..
        } = render_job;
        drop(process);
        let released = region.release();
        info!("shared region released");

        let sink = result?;
        released?;
        Ok(sink)
    }

    fn run_to_drained<S, H>(
        &mut self,
        job: &mut RenderJob,
        config: &JobConfig,
        sink: S,
        host: &H,
    ) -> Result<S, BridgeError>
    where
        S: DisplaySink + 'static,
        H: RenderHost,
    {
        let consumer = TileConsumer::new(job.region.try_clone()?, job.layout, sink)?;
        let update_loop = UpdateLoop::spawn(consumer, config.update_period)?;

        let poll_result = poll_until_exit(job, config, host);

        self.phase = JobPhase::Draining;
        debug!("draining: stopping update loop");
        let consumer = update_loop.stop();
        if let Err(err) = poll_result {
            // The loop result no longer matters; the job is aborting.
            drop(consumer);
            return Err(err);
        }
        let mut consumer = consumer?;

        // One final synchronous tick picks up tiles finished between the last
        // periodic tick and process exit; then the full-frame plane, if the
        // producer declared it complete, supersedes all partial tiles.
        consumer.consume_ready_tiles()?;
        if consumer.drain_final_frame()? {
            debug!("final full-frame update applied");
        }

        Ok(consumer.into_sink())
    }
}

/// Poll the renderer until it exits, relaying progress and handling
/// cooperative cancellation with a bounded grace period. Never blocks
/// indefinitely: liveness is sampled with `try_wait` plus a sleep.
fn poll_until_exit<H: RenderHost>(
    job: &mut RenderJob,
    config: &JobConfig,
    host: &H,
) -> Result<(), BridgeError> {
    let mut cancel_at: Option<Instant> = None;
    loop {
        match job.process.poll()? {
            ProcessState::Exited(code) => {
                debug!(?code, "renderer exited");
                return Ok(());
            }
            ProcessState::Running => {}
        }

        if cancel_at.is_none() && host.break_requested() {
            info!("cancellation requested; giving renderer a grace period");
            cancel_at = Some(Instant::now());
        }
        if let Some(at) = cancel_at {
            if at.elapsed() >= config.cancel_grace {
                job.process.force_terminate()?;
                return Ok(());
            }
        }

        host.report_progress(read_progress(&job.region, &job.layout)?);
        thread::sleep(config.poll_interval);
    }
}
