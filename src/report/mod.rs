//! Delta computation between two snapshots.
//!
//! CPU and disk values are derived from cumulative counters and need both
//! snapshots. Memory and swap are instantaneous and come from the current
//! snapshot alone.
//!
//! Zero-length intervals are not guarded: the affected percentages come out
//! as NaN or infinite and are rendered according to
//! [`NonFinite`](crate::config::NonFinite). Counter resets show up as
//! negative deltas.

mod format;
mod record;

pub use format::{format_record, format_total_header};
pub use record::{CpuUsage, DiskUsage, MemoryUsage, Record, SwapUsage};

use std::time::Instant;

use crate::collector::{CpuTimes, DiskIoCounters, SwapMemory, VirtualMemory};
use crate::config::{DiskMode, DiskUtilBase};
use crate::sampler::Snapshot;

const KIB: f64 = 1024.0;

/// Turns sample pairs into [`Record`]s.
///
/// Stateless between calls apart from the fixed device list.
#[derive(Debug, Clone)]
pub struct Reporter {
    devices: Vec<String>,
    disk_mode: DiskMode,
    disk_util: DiskUtilBase,
}

impl Reporter {
    pub fn new(devices: Vec<String>, disk_mode: DiskMode, disk_util: DiskUtilBase) -> Self {
        Self {
            devices,
            disk_mode,
            disk_util,
        }
    }

    /// Computes the record for the interval `previous → current`.
    ///
    /// `start` is the run start. It drives the `elapsed` field and, with
    /// [`DiskUtilBase::SinceStart`], the disk `util` denominator.
    pub fn report(&self, previous: &Snapshot, current: &Snapshot, start: Instant) -> Record {
        let interval_ms = current
            .taken_at
            .saturating_duration_since(previous.taken_at)
            .as_millis();
        let util_base_ms = match self.disk_util {
            DiskUtilBase::SinceStart => {
                current.taken_at.saturating_duration_since(start).as_millis()
            }
            DiskUtilBase::Interval => interval_ms,
        };

        let cpu = match (&previous.cpu, &current.cpu) {
            (Some(prev), Some(cur)) => Some(cpu_usage(prev, cur)),
            _ => None,
        };

        let disk = current.disk.as_ref().map(|_| {
            self.devices
                .iter()
                .map(|device| {
                    let usage = disk_usage(
                        previous.disk_counters(device),
                        current.disk_counters(device),
                        util_base_ms,
                        interval_ms,
                        self.disk_mode,
                    );
                    (device.clone(), usage)
                })
                .collect()
        });

        Record {
            elapsed_secs: elapsed_secs(start, current.taken_at),
            cpu,
            disk,
            memory: current.memory.as_ref().map(memory_usage),
            swap: current.swap.as_ref().map(swap_usage),
        }
    }
}

/// Whole seconds between `start` and `sample`, truncated from milliseconds.
pub fn elapsed_secs(start: Instant, sample: Instant) -> u64 {
    (sample.saturating_duration_since(start).as_millis() / 1000) as u64
}

/// CPU state shares between two aggregate readings.
pub fn cpu_usage(prev: &CpuTimes, cur: &CpuTimes) -> CpuUsage {
    let total = cur.total() - prev.total();
    let idle = cur.idle - prev.idle;
    let busy = total - idle;

    CpuUsage {
        busy_percent: busy / total * 100.0,
        system: (cur.system - prev.system) / total * 100.0,
        user: (cur.user - prev.user) / total * 100.0,
        nice: (cur.nice - prev.nice) / total * 100.0,
        idle: idle / total * 100.0,
    }
}

/// Disk activity between two readings taken `interval_ms` apart.
///
/// `util` is busy time over `util_base_ms`; rates use `interval_ms`.
pub fn disk_usage(
    prev: DiskIoCounters,
    cur: DiskIoCounters,
    util_base_ms: u128,
    interval_ms: u128,
    mode: DiskMode,
) -> DiskUsage {
    let interval_ms = interval_ms as f64;
    let io_time = cur.io_time_ms as f64 - prev.io_time_ms as f64;
    let read_kib = (cur.read_bytes as f64 - prev.read_bytes as f64) / KIB;
    let write_kib = (cur.write_bytes as f64 - prev.write_bytes as f64) / KIB;

    let (read, write) = match mode {
        DiskMode::Delta => (read_kib, write_kib),
        DiskMode::Rate => {
            let secs = interval_ms / 1000.0;
            (read_kib / secs, write_kib / secs)
        }
    };

    DiskUsage {
        util: io_time / util_base_ms as f64 * 100.0,
        read,
        write,
    }
}

pub fn memory_usage(mem: &VirtualMemory) -> MemoryUsage {
    MemoryUsage {
        used_percent: mem.used_percent,
        total: mem.total as f64 / KIB,
        used: mem.used as f64 / KIB,
        free: mem.free as f64 / KIB,
        shared: mem.shared as f64 / KIB,
        buffers: mem.buffers as f64 / KIB,
        cached: mem.cached as f64 / KIB,
        available: mem.available as f64 / KIB,
    }
}

pub fn swap_usage(swap: &SwapMemory) -> SwapUsage {
    SwapUsage {
        used_percent: swap.used_percent,
        total: swap.total as f64 / KIB,
        used: swap.used as f64 / KIB,
        free: swap.free as f64 / KIB,
    }
}
