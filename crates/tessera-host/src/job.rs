//! The owned state of one in-flight render.

use std::path::PathBuf;

use tessera_protocol::RegionLayout;
use tessera_region::SharedRegion;

use crate::supervisor::RendererProcess;

/// Lifecycle phases of the coordinator's state machine.
///
/// `Idle -> Allocating -> Running -> Draining -> Released -> Idle`; at most
/// one job occupies the non-`Idle` phases at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Allocating,
    Running,
    Draining,
    Released,
}

/// Everything one render owns: target geometry, the exported scene it was
/// started from, the shared region, and the renderer subprocess.
///
/// Bundled so the lifecycle code passes one object around instead of loose
/// handles; dropped (after region release) when the job ends.
pub struct RenderJob {
    pub layout: RegionLayout,
    pub scene_file: PathBuf,
    pub region: SharedRegion,
    pub process: RendererProcess,
}
