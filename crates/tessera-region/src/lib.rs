//! Shared region backing store.
//!
//! The renderer subprocess and the host display thread exchange pixels
//! through one fixed-size byte region backed by a regular file both processes
//! open by the same deterministic path ([`region_path`]). All access is
//! positional (`read_at`/`write_at` style) so independent handles in either
//! process can touch disjoint byte ranges concurrently; the kernel page cache
//! makes producer writes visible to consumer reads without an explicit flush.
//!
//! [`RegionStore`] is the access trait the consumer is written against;
//! [`MemRegion`] is the in-process stand-in used by tests. Every access is
//! bounds-checked here, centrally, so an out-of-range offset surfaces as
//! [`RegionError::OutOfBounds`] instead of ad hoc slicing panics. The host
//! treats that as fatal: it means the two sides disagree on layout.

mod error;

pub use error::{RegionError, Result};

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Fixed file name both processes derive inside the agreed directory.
pub const REGION_FILE_NAME: &str = "tessera-region.bin";

/// The deterministic backing path for a region rooted at `dir`.
///
/// Both sides must derive the path the same way; it is part of the protocol
/// contract even though the directory itself is host configuration.
pub fn region_path(dir: &Path) -> PathBuf {
    dir.join(REGION_FILE_NAME)
}

/// Byte-addressed access to a shared region.
///
/// Methods take `&self` so a handle can be shared across threads; positional
/// I/O needs no seek state.
pub trait RegionStore {
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()>;

    fn read_byte(&self, offset: u64) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_at(offset, &mut byte)?;
        Ok(byte[0])
    }

    fn write_byte(&self, offset: u64, value: u8) -> Result<()> {
        self.write_at(offset, &[value])
    }
}

fn check_bounds(offset: u64, len: usize, region_len: u64) -> Result<()> {
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= region_len => Ok(()),
        _ => Err(RegionError::OutOfBounds {
            offset,
            len,
            region_len,
        }),
    }
}

/// A file-backed shared region handle.
///
/// The creating side owns the backing file and unlinks it in [`release`];
/// handles obtained via [`open`] or [`try_clone`] never unlink.
///
/// [`release`]: SharedRegion::release
/// [`open`]: SharedRegion::open
/// [`try_clone`]: SharedRegion::try_clone
#[derive(Debug)]
pub struct SharedRegion {
    file: File,
    path: PathBuf,
    len: u64,
    owner: bool,
}

impl SharedRegion {
    /// Create (or truncate) the backing file at `path`, zero-filled to
    /// exactly `len` bytes.
    pub fn create(path: &Path, len: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        // Extending a truncated file zero-fills it, matching the protocol's
        // "all tiles pending, progress 0, no final frame" initial state.
        file.set_len(len)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            len,
            owner: true,
        })
    }

    /// Open an existing region file; the length is taken from the file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            path: path.to_path_buf(),
            len,
            owner: false,
        })
    }

    /// A second handle onto the same region, for use from another thread.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            file: self.file.try_clone()?,
            path: self.path.clone(),
            len: self.len,
            owner: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the handle and, when this handle created the region, unlink the
    /// backing file.
    pub fn release(self) -> Result<()> {
        let owner = self.owner;
        let path = self.path.clone();
        drop(self.file);
        if owner {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

impl RegionStore for SharedRegion {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_bounds(offset, buf.len(), self.len)?;
        read_exact_at(&self.file, offset, buf)
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()> {
        check_bounds(offset, buf.len(), self.len)?;
        write_all_at(&self.file, offset, buf)
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, offset: u64, buf: &mut [u8]) -> Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)?;
    Ok(())
}

#[cfg(unix)]
fn write_all_at(file: &File, offset: u64, buf: &[u8]) -> Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)?;
    Ok(())
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut offset: u64, mut buf: &mut [u8]) -> Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        let n = file.seek_read(buf, offset)?;
        if n == 0 {
            return Err(RegionError::Io(std::io::Error::from(
                std::io::ErrorKind::UnexpectedEof,
            )));
        }
        offset += n as u64;
        buf = &mut buf[n..];
    }
    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, mut offset: u64, mut buf: &[u8]) -> Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        let n = file.seek_write(buf, offset)?;
        offset += n as u64;
        buf = &buf[n..];
    }
    Ok(())
}

/// In-memory region used by tests and in-process producers.
///
/// Clones share the same storage, mirroring two file handles onto one
/// mapping.
#[derive(Debug, Clone)]
pub struct MemRegion {
    bytes: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
    len: u64,
}

impl MemRegion {
    pub fn new(len: usize) -> Self {
        Self {
            bytes: std::sync::Arc::new(std::sync::Mutex::new(vec![0u8; len])),
            len: len as u64,
        }
    }
}

impl RegionStore for MemRegion {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_bounds(offset, buf.len(), self.len)?;
        let bytes = self.bytes.lock().expect("region mutex poisoned");
        let start = offset as usize;
        buf.copy_from_slice(&bytes[start..start + buf.len()]);
        Ok(())
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()> {
        check_bounds(offset, buf.len(), self.len)?;
        let mut bytes = self.bytes.lock().expect("region mutex poisoned");
        let start = offset as usize;
        bytes[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_region_bounds_are_enforced() {
        let region = MemRegion::new(8);
        let mut buf = [0u8; 4];
        assert!(region.read_at(4, &mut buf).is_ok());
        assert!(matches!(
            region.read_at(5, &mut buf),
            Err(RegionError::OutOfBounds {
                offset: 5,
                len: 4,
                region_len: 8
            })
        ));
        assert!(region.write_at(u64::MAX, &[1]).is_err());
    }

    #[test]
    fn mem_region_clones_share_storage() {
        let region = MemRegion::new(4);
        let alias = region.clone();
        region.write_byte(2, 0xAB).unwrap();
        assert_eq!(alias.read_byte(2).unwrap(), 0xAB);
    }
}
