use std::io;
use std::path::PathBuf;

use tessera_protocol::ProtocolError;
use tessera_region::RegionError;
use thiserror::Error;

/// Host-side failure taxonomy.
///
/// `Configuration` is surfaced before anything is allocated; `Launch` after
/// the region exists (the coordinator releases it); `Protocol`/`Region` are
/// fatal producer/consumer disagreements that abort the job rather than
/// degrade the display. Cancellation is not represented here at all: a
/// cancelled render still drains and releases normally.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("failed to launch renderer {binary}: {source}")]
    Launch {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to poll renderer subprocess: {0}")]
    Poll(#[source] io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error("failed to spawn update loop thread: {0}")]
    Thread(#[source] io::Error),

    #[error("update loop thread panicked")]
    LoopPanicked,
}

impl BridgeError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
