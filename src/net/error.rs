//! Error types for reading interface counters and persisting snapshots.
//!
//! - [`Error`] aborts a collection: the counter table could not be read or its
//!   header does not have the expected shape.
//! - [`RecordError`] describes a single interface line that was skipped.
//! - [`HeaderError`] explains why a counter table header was rejected.
//! - [`StoreError`] is returned by [`SnapshotStore`](super::SnapshotStore)
//!   implementations and never aborts a collection.

use std::num::ParseIntError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("counter source `{path}` is unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("counter source `{path}` has a malformed header: {source}")]
    MalformedHeader {
        path: PathBuf,
        #[source]
        source: HeaderError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("missing header line {0}")]
    Missing(usize),
    #[error("header line {line} has an unexpected shape: `{content}`")]
    Shape { line: usize, content: String },
    #[error("{group} header is missing column `{column}`")]
    MissingColumn {
        group: &'static str,
        column: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("line {line}: missing `:` after interface name")]
    MissingSeparator { line: usize },
    #[error("line {line}: interface `{iface}` has {found} fields, expected {expected}")]
    FieldCount {
        iface: String,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid `{column}` value '{value}' for interface `{iface}`: {source}")]
    InvalidValue {
        iface: String,
        line: usize,
        column: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },
    #[error("line {line}: duplicate interface `{iface}`")]
    DuplicateInterface { iface: String, line: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read state file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode state file `{path}`: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write state file `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
