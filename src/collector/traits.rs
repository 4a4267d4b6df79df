//! Abstractions over the two seams of metric collection.
//!
//! - [`FileSystem`] lets the procfs provider read either the real `/proc`
//!   or an in-memory tree ([`MockFs`](crate::collector::MockFs)).
//! - [`MetricsProvider`] is the black-box interface the sampler consumes.
//!   Nothing above this trait knows where the numbers come from.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::collector::procfs::CollectError;

/// Abstraction for filesystem reads.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Aggregate CPU time counters, in seconds since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuTimes {
    pub user: f64,
    pub nice: f64,
    pub system: f64,
    pub idle: f64,
}

impl CpuTimes {
    /// Sum of the four tracked states.
    pub fn total(&self) -> f64 {
        self.user + self.nice + self.system + self.idle
    }
}

/// A mounted partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Block device path as it appears in the mount table (e.g. `/dev/sda1`).
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

/// Cumulative I/O counters of one block device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskIoCounters {
    /// Time spent doing I/Os (ms).
    pub io_time_ms: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Instantaneous RAM usage, all sizes in bytes.
///
/// `free`, `shared`, `buffers` and `cached` are Linux concepts. Providers for
/// other platforms may leave them at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VirtualMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub shared: u64,
    pub buffers: u64,
    pub cached: u64,
    pub available: u64,
    pub used_percent: f64,
}

/// Instantaneous swap usage, all sizes in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwapMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

/// Source of raw system metrics.
///
/// Every call is a synchronous point-in-time read. Implementations must not
/// mutate host state.
pub trait MetricsProvider {
    /// Aggregate CPU times across all cores.
    fn cpu_times(&self) -> Result<CpuTimes, CollectError>;

    /// Mounted partitions in mount-table order. With `exclude_virtual`, only
    /// partitions backed by a block-device filesystem are returned.
    fn partitions(&self, exclude_virtual: bool) -> Result<Vec<Partition>, CollectError>;

    /// I/O counters for the requested devices, keyed by the requested name.
    /// Devices the provider cannot find are absent from the map.
    fn disk_io_counters(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, DiskIoCounters>, CollectError>;

    fn virtual_memory(&self) -> Result<VirtualMemory, CollectError>;

    fn swap_memory(&self) -> Result<SwapMemory, CollectError>;
}

/// Percentage of `used` in `total`, 0 for an empty pool.
pub(crate) fn used_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadavg");
        std::fs::write(&path, "0.15 0.10 0.05 1/150 1234\n").unwrap();

        let fs = RealFs::new();
        let content = fs.read_to_string(&path).unwrap();
        assert!(content.starts_with("0.15"));
    }

    #[test]
    fn test_real_fs_exists() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        assert!(fs.exists(dir.path()));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_fs_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        let err = fs.read_to_string(&dir.path().join("stat")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_cpu_times_total() {
        let t = CpuTimes {
            user: 1.0,
            nice: 0.5,
            system: 2.0,
            idle: 6.5,
        };
        assert!((t.total() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_used_percent() {
        assert_eq!(used_percent(0, 0), 0.0);
        assert!((used_percent(25, 100) - 25.0).abs() < 1e-9);
        assert!((used_percent(100, 100) - 100.0).abs() < 1e-9);
    }
}
