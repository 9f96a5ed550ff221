//! Storage for the single snapshot kept between collections.

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::error::StoreError;
use super::stats::{InterfaceStats, Snapshot};
use crate::{fsutil, json};

/// A single-slot snapshot storage.
///
/// Every [`save`](SnapshotStore::save) replaces the previous snapshot; no history is kept.
pub trait SnapshotStore {
    /// Loads the stored snapshot, or `None` if nothing was stored yet.
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Replaces the stored snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for &T {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }
}

/// Stores the snapshot as a key-sorted, indented JSON document.
///
/// The document maps each interface name to its [`InterfaceStats`] with `avg` set to `0`.
/// The snapshot timestamp is carried by the file's modification time.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let read_error = |source| StoreError::Read {
            path: self.path.clone(),
            source,
        };
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No previous snapshot at `{}`", self.path.display());
                return Ok(None);
            }
            Err(err) => return Err(read_error(err)),
        };
        let timestamp = file
            .metadata()
            .and_then(|metadata| metadata.modified())
            .map_err(read_error)?;

        let stats: BTreeMap<String, InterfaceStats> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                StoreError::Decode {
                    path: self.path.clone(),
                    source,
                }
            })?;
        let interfaces = stats
            .iter()
            .map(|(iface, stats)| (iface.clone(), stats.into()))
            .collect();

        Ok(Some(Snapshot::new(timestamp, interfaces)))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let body = json::to_pretty_vec(&snapshot.to_stats()).map_err(StoreError::Encode)?;
        fsutil::replace_file(&self.path, &body, snapshot.timestamp).map_err(|source| {
            StoreError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }
}

/// Keeps the snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(slot.clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(snapshot.clone());
        Ok(())
    }
}
