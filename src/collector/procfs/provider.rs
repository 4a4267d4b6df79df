//! [`MetricsProvider`] implementation reading from `/proc/`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, trace};

use crate::collector::procfs::CollectError;
use crate::collector::procfs::parser::{
    parse_block_filesystems, parse_cpu_aggregate, parse_diskstats, parse_meminfo, parse_mounts,
};
use crate::collector::traits::{
    CpuTimes, DiskIoCounters, FileSystem, MetricsProvider, Partition, SwapMemory, VirtualMemory,
    used_percent,
};

/// Clock ticks per second (USER_HZ). Standard value for Linux.
const CLK_TCK: f64 = 100.0;

/// `/proc/diskstats` counts sectors of 512 bytes regardless of the device's
/// physical sector size.
const SECTOR_SIZE: u64 = 512;

/// Reads system-wide metrics from a procfs tree.
pub struct ProcfsProvider<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> ProcfsProvider<F> {
    /// Creates a new provider.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    fn read(&self, relative: &str) -> Result<String, CollectError> {
        let path = format!("{}/{}", self.proc_path, relative);
        trace!("reading {}", path);
        Ok(self.fs.read_to_string(Path::new(&path))?)
    }

    /// Mount table of the current mount namespace, falling back to the
    /// legacy `/proc/mounts` location.
    fn read_mounts(&self) -> Result<String, CollectError> {
        let self_mounts = format!("{}/self/mounts", self.proc_path);
        if self.fs.exists(Path::new(&self_mounts)) {
            self.read("self/mounts")
        } else {
            self.read("mounts")
        }
    }
}

impl<F: FileSystem> MetricsProvider for ProcfsProvider<F> {
    fn cpu_times(&self) -> Result<CpuTimes, CollectError> {
        let content = self.read("stat")?;
        let cpu = parse_cpu_aggregate(&content)?.ok_or(CollectError::MissingCpuAggregate)?;

        Ok(CpuTimes {
            user: cpu.user as f64 / CLK_TCK,
            nice: cpu.nice as f64 / CLK_TCK,
            system: cpu.system as f64 / CLK_TCK,
            idle: cpu.idle as f64 / CLK_TCK,
        })
    }

    fn partitions(&self, exclude_virtual: bool) -> Result<Vec<Partition>, CollectError> {
        let mounts = parse_mounts(&self.read_mounts()?);

        let block_fs: Option<HashSet<String>> = if exclude_virtual {
            Some(parse_block_filesystems(&self.read("filesystems")?))
        } else {
            None
        };

        let partitions: Vec<Partition> = mounts
            .into_iter()
            .filter(|m| block_fs.as_ref().is_none_or(|fs| fs.contains(&m.fstype)))
            .map(|m| Partition {
                device: m.device,
                mountpoint: m.mountpoint,
                fstype: m.fstype,
            })
            .collect();

        debug!("{} partitions found", partitions.len());
        Ok(partitions)
    }

    fn disk_io_counters(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, DiskIoCounters>, CollectError> {
        let disks = parse_diskstats(&self.read("diskstats")?)?;

        let by_kernel_name: HashMap<&str, DiskIoCounters> = disks
            .iter()
            .map(|disk| {
                (
                    disk.device.as_str(),
                    DiskIoCounters {
                        io_time_ms: disk.io_time,
                        read_bytes: disk.read_sectors.saturating_mul(SECTOR_SIZE),
                        write_bytes: disk.write_sectors.saturating_mul(SECTOR_SIZE),
                    },
                )
            })
            .collect();

        // Mount tables name devices `/dev/sda1`, diskstats names them `sda1`.
        Ok(names
            .iter()
            .filter_map(|name| {
                let kernel_name = name.strip_prefix("/dev/").unwrap_or(name);
                by_kernel_name
                    .get(kernel_name)
                    .map(|counters| (name.clone(), *counters))
            })
            .collect())
    }

    fn virtual_memory(&self) -> Result<VirtualMemory, CollectError> {
        let info = parse_meminfo(&self.read("meminfo")?)?;

        let total = info.mem_total * 1024;
        let free = info.mem_free * 1024;
        let buffers = info.buffers * 1024;
        let cached = (info.cached + info.s_reclaimable) * 1024;
        let available = info
            .mem_available
            .map(|kb| kb * 1024)
            .unwrap_or(free + buffers + cached);
        let used = total.saturating_sub(free + buffers + cached);

        Ok(VirtualMemory {
            total,
            used,
            free,
            shared: info.shmem * 1024,
            buffers,
            cached,
            available,
            used_percent: used_percent(used, total),
        })
    }

    fn swap_memory(&self) -> Result<SwapMemory, CollectError> {
        let info = parse_meminfo(&self.read("meminfo")?)?;

        let total = info.swap_total * 1024;
        let free = info.swap_free * 1024;
        let used = total.saturating_sub(free);

        Ok(SwapMemory {
            total,
            used,
            free,
            used_percent: used_percent(used, total),
        })
    }
}
