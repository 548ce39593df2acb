//! Host configuration for a renderer installation and a single render job.

use std::path::PathBuf;
use std::time::Duration;

use tessera_protocol::TILE_SIZE;

/// Where the renderer lives and how it is invoked.
///
/// The renderer is started as `binary <scene_file> <mode_flag>` with the
/// working directory set to `working_dir` (normally the install directory,
/// so the renderer resolves its own data files).
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub binary: PathBuf,
    pub working_dir: PathBuf,
    pub mode_flag: String,
}

impl RendererConfig {
    pub fn new(binary: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.into(),
            mode_flag: "preview".to_owned(),
        }
    }
}

/// Parameters of one render job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    /// Path to the already-exported scene description. Scene serialization is
    /// the exporter's concern; the file must exist before the job starts.
    pub scene_file: PathBuf,
    /// Directory the shared region file is created in. Both processes derive
    /// the same file name inside it.
    pub region_dir: PathBuf,
    /// Period of the tile update loop.
    pub update_period: Duration,
    /// Sleep between subprocess liveness/progress polls.
    pub poll_interval: Duration,
    /// How long a cancelled renderer gets to exit before it is killed.
    pub cancel_grace: Duration,
}

impl JobConfig {
    pub fn new(
        width: u32,
        height: u32,
        scene_file: impl Into<PathBuf>,
        region_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            width,
            height,
            tile_size: TILE_SIZE,
            scene_file: scene_file.into(),
            region_dir: region_dir.into(),
            update_period: Duration::from_secs(1),
            poll_interval: Duration::from_millis(50),
            cancel_grace: Duration::from_secs(2),
        }
    }
}
