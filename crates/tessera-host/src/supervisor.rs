//! Renderer subprocess supervision.
//!
//! The renderer is an external binary invoked as
//! `binary <scene_file> <mode_flag>` with its install directory as the
//! working directory. Liveness is observed by non-blocking polling only; the
//! exit code carries no meaning beyond "the process has exited". Cancellation
//! is cooperative at this layer: the coordinator samples the host's break
//! flag each poll tick and calls [`RendererProcess::force_terminate`] once
//! the grace period runs out.

use std::path::Path;
use std::process::{Child, Command};

use tracing::{debug, warn};

use crate::config::RendererConfig;
use crate::error::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    /// `None` when the process was killed by a signal.
    Exited(Option<i32>),
}

#[derive(Debug)]
pub struct RendererProcess {
    child: Child,
}

impl RendererProcess {
    pub fn spawn(config: &RendererConfig, scene_file: &Path) -> Result<Self, BridgeError> {
        let child = Command::new(&config.binary)
            .arg(scene_file)
            .arg(&config.mode_flag)
            .current_dir(&config.working_dir)
            .spawn()
            .map_err(|source| BridgeError::Launch {
                binary: config.binary.clone(),
                source,
            })?;
        debug!(pid = child.id(), binary = %config.binary.display(), "renderer spawned");
        Ok(Self { child })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Non-blocking liveness check.
    pub fn poll(&mut self) -> Result<ProcessState, BridgeError> {
        match self.child.try_wait().map_err(BridgeError::Poll)? {
            None => Ok(ProcessState::Running),
            Some(status) => Ok(ProcessState::Exited(status.code())),
        }
    }

    /// Kill the subprocess and reap it. Safe to call after it already exited.
    pub fn force_terminate(&mut self) -> Result<(), BridgeError> {
        match self.child.try_wait().map_err(BridgeError::Poll)? {
            Some(_) => Ok(()),
            None => {
                warn!(pid = self.child.id(), "force-terminating renderer");
                // kill on an already-dead process reports InvalidInput; the
                // subsequent wait still reaps it either way.
                let _ = self.child.kill();
                self.child.wait().map_err(BridgeError::Poll)?;
                Ok(())
            }
        }
    }
}

impl Drop for RendererProcess {
    fn drop(&mut self) {
        // Backstop for abandoned handles on error paths; normal shutdown has
        // already reaped the child here.
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
