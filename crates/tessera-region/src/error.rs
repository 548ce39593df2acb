use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegionError>;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("i/o error on region backing: {0}")]
    Io(#[from] io::Error),

    #[error("region access out of bounds: offset {offset} + {len} bytes exceeds region of {region_len} bytes")]
    OutOfBounds {
        offset: u64,
        len: usize,
        region_len: u64,
    },
}
