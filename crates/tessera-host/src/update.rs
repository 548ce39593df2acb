//! The periodically-woken update task.
//!
//! A plain thread with a stop flag checked at tick boundaries: the loop runs
//! one consumer tick, then sleeps the configured period in short slices so a
//! stop request is observed promptly even with a long period. `stop()`
//! signals, joins, and returns the consumer so the caller can run the final
//! synchronous tick and the full-frame drain on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tessera_region::RegionStore;
use tracing::debug;

use crate::consume::TileConsumer;
use crate::error::BridgeError;
use crate::sink::DisplaySink;

/// Upper bound on one sleep slice, so stop latency stays bounded regardless
/// of the update period.
const MAX_SLEEP_SLICE: Duration = Duration::from_millis(50);

pub struct UpdateLoop<R, S>
where
    R: RegionStore + Send + 'static,
    S: DisplaySink + 'static,
{
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Result<TileConsumer<R, S>, BridgeError>>,
}

impl<R, S> UpdateLoop<R, S>
where
    R: RegionStore + Send + 'static,
    S: DisplaySink + 'static,
{
    pub fn spawn(
        mut consumer: TileConsumer<R, S>,
        period: Duration,
    ) -> Result<Self, BridgeError> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("tessera-update".into())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    // A decode or region error here is fatal; it surfaces
                    // through the join result and aborts the job.
                    consumer.consume_ready_tiles()?;
                    sleep_interruptibly(period, &flag);
                }
                debug!("update loop stopped");
                Ok(consumer)
            })
            .map_err(BridgeError::Thread)?;

        Ok(Self { stop, handle })
    }

    /// Signal the loop to stop after its in-flight tick, join it, and hand
    /// the consumer back (or the error that aborted the loop).
    pub fn stop(self) -> Result<TileConsumer<R, S>, BridgeError> {
        self.stop.store(true, Ordering::Release);
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(BridgeError::LoopPanicked),
        }
    }
}

fn sleep_interruptibly(period: Duration, stop: &AtomicBool) {
    let mut remaining = period;
    while !remaining.is_zero() && !stop.load(Ordering::Acquire) {
        let slice = remaining.min(MAX_SLEEP_SLICE);
        thread::sleep(slice);
        remaining -= slice;
    }
}
