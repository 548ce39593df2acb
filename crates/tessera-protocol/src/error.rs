use thiserror::Error;

/// Errors raised when the two sides of the shared region disagree.
///
/// These are fatal by design: a layout or length mismatch means the producer
/// and consumer computed different region geometry and any further decode
/// could display corrupt pixels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("image dimensions must be non-zero (got {width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("tile size must be non-zero")]
    ZeroTileSize,

    #[error("region layout does not fit in addressable memory")]
    LayoutOverflow,

    #[error("tile index {index} out of range (tile count {tile_count})")]
    TileIndexOutOfRange { index: usize, tile_count: usize },

    #[error("tile payload length mismatch: expected {expected} bytes, got {actual}")]
    PayloadLenMismatch { expected: usize, actual: usize },

    #[error("shared region size mismatch: layout requires {expected} bytes, region has {actual}")]
    RegionSizeMismatch { expected: usize, actual: u64 },
}
