//! Static host facts: uptime, kernel, distribution, CPU, memory and disk capacity.
//!
//! Every reader takes the path of the file it parses, so callers can resolve them
//! below an alternative root filesystem (see [`Config::host_path`](crate::config::Config::host_path)).
mod cpu;
mod disk;
mod error;
mod meminfo;
mod parser;
mod system;

use std::path::Path;

pub use cpu::{CpuInfo, cpu_info};
pub use disk::{DiskUsage, disk_usage};
pub use error::{Error, Result};
pub use meminfo::MemInfo;
pub use parser::{KeyValueStat, StatParseError};
pub use system::{distribution, kernel_release, uptime};

/// Reads [`MemInfo`] from a `/proc/meminfo` formatted file.
///
/// # Errors
///
/// Fails if the file cannot be opened or one of the memory fields is malformed.
pub fn mem_info(path: impl AsRef<Path>) -> Result<MemInfo> {
    let path = path.as_ref();
    let mut reader = crate::fsutil::open_file_reader(path)?;
    MemInfo::from_reader(&mut reader).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}
