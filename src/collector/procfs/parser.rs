//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.

use std::collections::HashSet;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parsed data from `/proc/meminfo`, values in kB.
#[derive(Debug, Clone, Default)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    /// `None` on kernels older than 3.14.
    pub mem_available: Option<u64>,
    pub buffers: u64,
    pub cached: u64,
    pub shmem: u64,
    pub s_reclaimable: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();
    let mut seen_total = false;

    let parse_kb = |line: &str| -> u64 {
        line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    for line in content.lines() {
        let Some((key, _)) = line.split_once(':') else {
            continue;
        };
        match key {
            "MemTotal" => {
                info.mem_total = parse_kb(line);
                seen_total = true;
            }
            "MemFree" => info.mem_free = parse_kb(line),
            "MemAvailable" => info.mem_available = Some(parse_kb(line)),
            "Buffers" => info.buffers = parse_kb(line),
            "Cached" => info.cached = parse_kb(line),
            "Shmem" => info.shmem = parse_kb(line),
            "SReclaimable" => info.s_reclaimable = parse_kb(line),
            "SwapTotal" => info.swap_total = parse_kb(line),
            "SwapFree" => info.swap_free = parse_kb(line),
            _ => {}
        }
    }

    if !seen_total {
        return Err(ParseError::new("missing MemTotal in meminfo"));
    }

    Ok(info)
}

/// Aggregate CPU line from `/proc/stat`, in clock ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuStat {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// Per-core `cpuN` lines and the remaining counters are ignored.
/// Returns `Ok(None)` when the aggregate line is absent.
pub fn parse_cpu_aggregate(content: &str) -> Result<Option<CpuStat>, ParseError> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("cpu") {
            continue;
        }

        let fields: Vec<&str> = parts.collect();
        if fields.len() < 4 {
            return Err(ParseError::new(format!(
                "not enough fields in cpu line: expected 4+, got {}",
                fields.len()
            )));
        }

        let parse_field = |idx: usize, name: &str| -> Result<u64, ParseError> {
            fields[idx]
                .parse()
                .map_err(|_| ParseError::new(format!("invalid cpu {}", name)))
        };

        return Ok(Some(CpuStat {
            user: parse_field(0, "user")?,
            nice: parse_field(1, "nice")?,
            system: parse_field(2, "system")?,
            idle: parse_field(3, "idle")?,
        }));
    }

    Ok(None)
}

// ============ Disk Stats Parser ============

/// Parsed data from `/proc/diskstats`.
#[derive(Debug, Clone, Default)]
pub struct DiskStats {
    /// Device name (sda, nvme0n1, etc.)
    pub device: String,
    /// Number of sectors read
    pub read_sectors: u64,
    /// Number of sectors written
    pub write_sectors: u64,
    /// Time spent doing I/Os (ms)
    pub io_time: u64,
}

/// Parses `/proc/diskstats` content.
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged w_sectors w_time io_pending io_time w_io_time [discards ...]
pub fn parse_diskstats(content: &str) -> Result<Vec<DiskStats>, ParseError> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue; // Skip malformed lines
        }

        let get_val =
            |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        disks.push(DiskStats {
            device: parts[2].to_string(),
            read_sectors: get_val(5),
            write_sectors: get_val(9),
            io_time: get_val(12),
        });
    }

    Ok(disks)
}

// ============ Mount Table Parsers ============

/// One entry of `/proc/self/mounts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

/// Parses `/proc/self/mounts` (fstab format).
///
/// Format: `device mountpoint fstype options dump pass`. Octal escapes such
/// as `\040` in paths are decoded.
pub fn parse_mounts(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let device = parts.next()?;
            let mountpoint = parts.next()?;
            let fstype = parts.next()?;
            Some(MountEntry {
                device: unescape_octal(device),
                mountpoint: unescape_octal(mountpoint),
                fstype: fstype.to_string(),
            })
        })
        .collect()
}

/// Parses `/proc/filesystems` and returns the filesystem types backed by a
/// block device (lines without the `nodev` marker).
pub fn parse_block_filesystems(content: &str) -> HashSet<String> {
    content
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [fstype] => Some(fstype.to_string()),
                _ => None,
            }
        })
        .collect()
}

fn unescape_octal(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escape = bytes.get(i + 1..i + 4).filter(|digits| {
            bytes[i] == b'\\' && digits.iter().all(|b| (b'0'..=b'7').contains(b))
        });
        if let Some(digits) = escape {
            let code = digits
                .iter()
                .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
            out.push(code as u8);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:          100 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
Shmem:            131072 kB
SReclaimable:     256000 kB
";
        let info = parse_meminfo(content).unwrap();

        assert_eq!(info.mem_total, 16384000);
        assert_eq!(info.mem_free, 8192000);
        assert_eq!(info.mem_available, Some(12000000));
        assert_eq!(info.buffers, 512000);
        // SwapCached must not overwrite Cached
        assert_eq!(info.cached, 2048000);
        assert_eq!(info.shmem, 131072);
        assert_eq!(info.s_reclaimable, 256000);
        assert_eq!(info.swap_total, 4096000);
        assert_eq!(info.swap_free, 4096000);
    }

    #[test]
    fn test_parse_meminfo_old_kernel() {
        let content = "MemTotal: 1024 kB\nMemFree: 512 kB\n";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info.mem_available, None);
    }

    #[test]
    fn test_parse_meminfo_missing_total() {
        assert!(parse_meminfo("MemFree: 512 kB\n").is_err());
    }

    #[test]
    fn test_parse_cpu_aggregate() {
        let content = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
ctxt 500000
btime 1700000000
";
        let cpu = parse_cpu_aggregate(content).unwrap().unwrap();

        assert_eq!(
            cpu,
            CpuStat {
                user: 10000,
                nice: 500,
                system: 3000,
                idle: 80000,
            }
        );
    }

    #[test]
    fn test_parse_cpu_aggregate_missing() {
        let content = "cpu0 2500 125 750 20000\nctxt 1\n";
        assert_eq!(parse_cpu_aggregate(content).unwrap(), None);
    }

    #[test]
    fn test_parse_cpu_aggregate_invalid() {
        assert!(parse_cpu_aggregate("cpu 1 2 x 4\n").is_err());
        assert!(parse_cpu_aggregate("cpu 1 2\n").is_err());
    }

    #[test]
    fn test_parse_diskstats() {
        let content = "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 0 0 0 0
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
   7       0 loop0 1 2
";
        let disks = parse_diskstats(content).unwrap();

        assert_eq!(disks.len(), 3);

        assert_eq!(disks[0].device, "sda");
        assert_eq!(disks[0].read_sectors, 56789);
        assert_eq!(disks[0].write_sectors, 98765);
        assert_eq!(disks[0].io_time, 150);

        assert_eq!(disks[2].device, "nvme0n1");
        assert_eq!(disks[2].io_time, 1000);
    }

    #[test]
    fn test_parse_mounts() {
        let content = "\
/dev/sda1 / ext4 rw,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sdb1 /mnt/my\\040disk xfs rw 0 0
";
        let mounts = parse_mounts(content);

        assert_eq!(mounts.len(), 3);
        assert_eq!(mounts[0].device, "/dev/sda1");
        assert_eq!(mounts[0].mountpoint, "/");
        assert_eq!(mounts[0].fstype, "ext4");
        assert_eq!(mounts[1].fstype, "proc");
        assert_eq!(mounts[2].mountpoint, "/mnt/my disk");
    }

    #[test]
    fn test_parse_block_filesystems() {
        let content = "\
nodev\tsysfs
nodev\tproc
\text4
\tsquashfs
nodev\ttmpfs
\txfs
";
        let fs = parse_block_filesystems(content);

        assert_eq!(fs.len(), 3);
        assert!(fs.contains("ext4"));
        assert!(fs.contains("squashfs"));
        assert!(fs.contains("xfs"));
        assert!(!fs.contains("proc"));
    }
}
