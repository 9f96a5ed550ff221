//! Network interface statistics with average throughput across invocations.
//!
//! Interface counters are cumulative, so a single read only yields totals. To report
//! throughput, every collection stores its raw counters in a [`SnapshotStore`] and the
//! next collection divides the counter increase by the time elapsed since then.
//!
//! # Key Components
//!
//! - [`CounterSource`] / [`ProcNetDev`]: read the current counters of all interfaces.
//! - [`SnapshotStore`] / [`FileStore`] / [`MemoryStore`]: keep the single previous snapshot.
//! - [`RateAccumulator`]: combines both and computes the per-interface averages.
//!
//! # Example
//!
//! ```no_run
//! use hoststat::net::{FileStore, ProcNetDev, RateAccumulator};
//!
//! let accumulator = RateAccumulator::new(
//!     ProcNetDev::new("/proc/net/dev"),
//!     FileStore::new("/tmp/network_stats"),
//! );
//! let collection = accumulator.collect()?;
//! for (iface, stats) in &collection.interfaces {
//!     println!("{iface}: {} B/s in, {} B/s out", stats.receive.avg, stats.transmit.avg);
//! }
//! # Ok::<(), hoststat::net::Error>(())
//! ```
mod accumulator;
mod counters;
mod error;
mod stats;
mod store;

pub use accumulator::{Collection, RateAccumulator, average_rate, compute_rates};
pub use counters::{CounterSource, CounterTable, ProcNetDev, parse_counter_table};
pub use error::{Error, HeaderError, RecordError, Result, StoreError};
pub use stats::{DirectionStats, InterfaceCounters, InterfaceStats, Snapshot};
pub use store::{FileStore, MemoryStore, SnapshotStore};
