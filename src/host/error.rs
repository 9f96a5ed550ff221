use std::path::PathBuf;

use super::parser::StatParseError;
use crate::fsutil;

/// Errors that may occur while reading static host facts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error("failed to read file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: StatParseError,
    },
    #[error("missing `{field}` in file `{path}`")]
    MissingField { path: PathBuf, field: &'static str },
    #[error("invalid uptime '{value}' in file `{path}`: {source}")]
    InvalidUptime {
        path: PathBuf,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("mount point `{path}` contains a NUL byte")]
    InvalidMountPoint { path: PathBuf },
    #[error("failed to query filesystem statistics of `{path}`: {source}")]
    Statvfs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
