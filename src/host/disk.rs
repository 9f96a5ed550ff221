use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use serde::Serialize;

use super::{Error, Result};

const MIB: u128 = 1024 * 1024;

/// Capacity of a mounted filesystem, in MiB (truncated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub free: u64,
    pub total: u64,
}

impl DiskUsage {
    /// Computes the usage from a block size and block counts.
    pub fn from_blocks(block_size: u64, blocks: u64, free_blocks: u64) -> Self {
        let mib = |count: u64| (u128::from(block_size) * u128::from(count) / MIB) as u64;
        Self {
            free: mib(free_blocks),
            total: mib(blocks),
        }
    }
}

/// Queries the filesystem mounted at `path` with `statvfs(2)`.
///
/// # Errors
///
/// Fails if `path` contains a NUL byte or the system call fails.
#[allow(clippy::useless_conversion)]
pub fn disk_usage(path: impl AsRef<Path>) -> Result<DiskUsage> {
    let path = path.as_ref();
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        Error::InvalidMountPoint {
            path: path.to_path_buf(),
        }
    })?;

    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: `c_path` is NUL-terminated and `stat` points to writable memory of the right size.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if rc != 0 {
        return Err(Error::Statvfs {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }
    // SAFETY: statvfs returned success, so the struct is initialized.
    let stat = unsafe { stat.assume_init() };

    Ok(DiskUsage::from_blocks(
        u64::from(stat.f_bsize),
        u64::from(stat.f_blocks),
        u64::from(stat.f_bfree),
    ))
}
