//! Point-in-time metric capture.

use std::collections::HashMap;
use std::time::Instant;

use crate::collector::{CpuTimes, DiskIoCounters, SwapMemory, VirtualMemory};

/// One read of all enabled metric sections.
///
/// A section is `None` when it is disabled in the configuration.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Monotonic time at which the read completed.
    pub taken_at: Instant,
    /// Cumulative CPU counters.
    pub cpu: Option<CpuTimes>,
    /// Cumulative counters per configured device. Devices the provider could
    /// not find are absent.
    pub disk: Option<HashMap<String, DiskIoCounters>>,
    /// Instantaneous memory usage.
    pub memory: Option<VirtualMemory>,
    /// Instantaneous swap usage.
    pub swap: Option<SwapMemory>,
}

impl Snapshot {
    /// Creates a snapshot with no sections.
    pub fn empty(taken_at: Instant) -> Self {
        Self {
            taken_at,
            cpu: None,
            disk: None,
            memory: None,
            swap: None,
        }
    }

    /// Counters for `device`, all zero when the device is missing from this
    /// snapshot (not present on the host, or disk section disabled).
    pub fn disk_counters(&self, device: &str) -> DiskIoCounters {
        self.disk
            .as_ref()
            .and_then(|disks| disks.get(device))
            .copied()
            .unwrap_or_default()
    }
}
