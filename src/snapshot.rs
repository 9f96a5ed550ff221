use std::collections::BTreeMap;

use serde::Serialize;

use crate::host::{CpuInfo, DiskUsage, MemInfo};
use crate::net::InterfaceStats;

/// The complete point-in-time description of the host.
///
/// Fields are declared in alphabetical order so the printed document is key-sorted.
/// Facts that could not be collected are `null`.
#[derive(Debug, Clone, Serialize)]
pub struct HostSnapshot {
    pub cpu: Option<CpuInfo>,
    /// Capacity per mount point, in MiB.
    pub disk: BTreeMap<String, DiskUsage>,
    pub docker: Option<serde_json::Value>,
    pub kernel: Option<String>,
    pub linux: Option<String>,
    pub memory: Option<MemInfo>,
    pub network: BTreeMap<String, InterfaceStats>,
    /// Seconds since boot.
    pub uptime: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_facts_serialize_as_null() {
        let snapshot = HostSnapshot {
            cpu: None,
            disk: BTreeMap::new(),
            docker: None,
            kernel: Some("6.8.0".to_owned()),
            linux: None,
            memory: None,
            network: BTreeMap::new(),
            uptime: Some(42),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"cpu":null,"disk":{},"docker":null,"kernel":"6.8.0","linux":null,"memory":null,"network":{},"uptime":42}"#
        );
    }
}
