use std::collections::BTreeMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Cumulative counters for a single interface, as reported in `/proc/net/dev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterfaceCounters {
    /// Bytes received.
    pub rx_bytes: u64,
    /// Packets received.
    pub rx_packets: u64,
    /// Receive errors.
    pub rx_errs: u64,

    /// Bytes transmitted.
    pub tx_bytes: u64,
    /// Packets transmitted.
    pub tx_packets: u64,
    /// Transmit errors.
    pub tx_errs: u64,
}

/// Interface counters captured at a single point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp: SystemTime,
    pub interfaces: BTreeMap<String, InterfaceCounters>,
}

impl Snapshot {
    pub fn new(timestamp: SystemTime, interfaces: BTreeMap<String, InterfaceCounters>) -> Self {
        Self {
            timestamp,
            interfaces,
        }
    }

    /// Returns the interfaces in their serialized form, with every `avg` left at zero.
    pub fn to_stats(&self) -> BTreeMap<String, InterfaceStats> {
        self.interfaces
            .iter()
            .map(|(iface, counters)| (iface.clone(), InterfaceStats::from(*counters)))
            .collect()
    }
}

/// Totals and average rate for one traffic direction.
///
/// Fields are declared in alphabetical order so serialized objects come out key-sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectionStats {
    /// Average bytes per second since the previous snapshot, `0` when unknown.
    #[serde(default)]
    pub avg: u64,
    pub total_bytes: u64,
    pub total_errors: u64,
    pub total_packets: u64,
}

/// Serialized per-interface statistics.
///
/// The same shape is used for the emitted network section and for the state file;
/// the latter always carries `avg: 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceStats {
    pub receive: DirectionStats,
    pub transmit: DirectionStats,
}

impl InterfaceStats {
    /// Sets the receive and transmit averages.
    pub fn with_rates(mut self, rx_avg: u64, tx_avg: u64) -> Self {
        self.receive.avg = rx_avg;
        self.transmit.avg = tx_avg;
        self
    }
}

impl From<InterfaceCounters> for InterfaceStats {
    fn from(c: InterfaceCounters) -> Self {
        Self {
            receive: DirectionStats {
                avg: 0,
                total_bytes: c.rx_bytes,
                total_errors: c.rx_errs,
                total_packets: c.rx_packets,
            },
            transmit: DirectionStats {
                avg: 0,
                total_bytes: c.tx_bytes,
                total_errors: c.tx_errs,
                total_packets: c.tx_packets,
            },
        }
    }
}

impl From<&InterfaceStats> for InterfaceCounters {
    fn from(s: &InterfaceStats) -> Self {
        Self {
            rx_bytes: s.receive.total_bytes,
            rx_packets: s.receive.total_packets,
            rx_errs: s.receive.total_errors,
            tx_bytes: s.transmit.total_bytes,
            tx_packets: s.transmit.total_packets,
            tx_errs: s.transmit.total_errors,
        }
    }
}
