use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use super::counters::CounterSource;
use super::error::{RecordError, Result, StoreError};
use super::stats::{InterfaceStats, Snapshot};
use super::store::SnapshotStore;

/// The outcome of one collection.
#[derive(Debug)]
pub struct Collection {
    /// Every interface of the current read, with averages since the stored snapshot.
    pub interfaces: BTreeMap<String, InterfaceStats>,
    /// Interface lines that could not be parsed and were left out.
    pub skipped: Vec<RecordError>,
    /// Set if the new snapshot could not be stored. The averages are still valid.
    pub persist_error: Option<StoreError>,
}

/// Computes per-interface average throughput between consecutive collections.
///
/// Each collection reads the current counters from `source`, compares them with the
/// snapshot held by `store`, and replaces that snapshot with the current one.
/// Concurrent collections against the same store are not coordinated.
#[derive(Debug)]
pub struct RateAccumulator<S, T> {
    source: S,
    store: T,
}

impl<S: CounterSource, T: SnapshotStore> RateAccumulator<S, T> {
    pub fn new(source: S, store: T) -> Self {
        Self { source, store }
    }

    /// Collects the current counters, timestamped with the system clock.
    ///
    /// # Errors
    ///
    /// See [`collect_at`](Self::collect_at).
    pub fn collect(&self) -> Result<Collection> {
        self.collect_at(SystemTime::now())
    }

    /// Collects the current counters as captured at `now`.
    ///
    /// A stored snapshot that cannot be loaded is logged and treated as absent. Failing to
    /// store the new snapshot does not fail the collection; see [`Collection::persist_error`].
    ///
    /// # Errors
    ///
    /// Returns an error if the counter source cannot be read. The stored snapshot is left
    /// untouched in that case.
    pub fn collect_at(&self, now: SystemTime) -> Result<Collection> {
        let table = self.source.read_counters()?;
        for record in &table.skipped {
            log::warn!("Skipping malformed interface record: {record}");
        }
        let current = Snapshot::new(now, table.interfaces);

        let previous = match self.store.load() {
            Ok(previous) => previous,
            Err(err) => {
                log::warn!("Ignoring previous network snapshot: {err}");
                None
            }
        };
        let interfaces = compute_rates(&current, previous.as_ref());

        let persist_error = self.store.save(&current).err();
        if let Some(err) = &persist_error {
            log::warn!("Failed to persist network snapshot: {err}");
        }

        Ok(Collection {
            interfaces,
            skipped: table.skipped,
            persist_error,
        })
    }
}

/// Attaches average rates since `previous` to every interface of `current`.
///
/// An interface gets non-zero averages only if `previous` holds it and was taken
/// strictly earlier than `current`.
pub fn compute_rates(
    current: &Snapshot,
    previous: Option<&Snapshot>,
) -> BTreeMap<String, InterfaceStats> {
    let elapsed = previous
        .and_then(|previous| current.timestamp.duration_since(previous.timestamp).ok())
        .filter(|elapsed| !elapsed.is_zero());
    match (previous, elapsed) {
        (Some(_), None) => {
            log::debug!("Previous network snapshot is not older than the current one")
        }
        (None, _) => log::debug!("No previous network snapshot, reporting zero averages"),
        _ => {}
    }

    current
        .interfaces
        .iter()
        .map(|(iface, counters)| {
            let stats = InterfaceStats::from(*counters);
            let prior = previous.and_then(|previous| previous.interfaces.get(iface));
            let stats = match (prior, elapsed) {
                (Some(prior), Some(elapsed)) => stats.with_rates(
                    average_rate(counters.rx_bytes, prior.rx_bytes, elapsed),
                    average_rate(counters.tx_bytes, prior.tx_bytes, elapsed),
                ),
                _ => stats,
            };
            (iface.clone(), stats)
        })
        .collect()
}

/// Average per-second increase from `prior` to `current`, truncated toward zero.
///
/// A decrease means the counter was reset and yields `0`.
pub fn average_rate(current: u64, prior: u64, elapsed: Duration) -> u64 {
    let nanos = elapsed.as_nanos();
    if nanos == 0 {
        return 0;
    }
    let delta = u128::from(current.saturating_sub(prior));
    u64::try_from(delta * 1_000_000_000 / nanos).unwrap_or(u64::MAX)
}
