//! Derived metrics of one sample pair, ready for rendering.

/// CPU state shares of the interval, in percent of total CPU time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuUsage {
    pub busy_percent: f64,
    pub system: f64,
    pub user: f64,
    pub nice: f64,
    pub idle: f64,
}

/// Activity of one disk over the interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    /// Percent of the interval the device was busy.
    pub util: f64,
    /// KiB read, or KiB/s in [`DiskMode::Rate`](crate::config::DiskMode::Rate).
    pub read: f64,
    /// KiB written, or KiB/s in [`DiskMode::Rate`](crate::config::DiskMode::Rate).
    pub write: f64,
}

/// Memory usage at the end of the interval. Sizes in KiB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    pub used_percent: f64,
    pub total: f64,
    pub used: f64,
    pub free: f64,
    pub shared: f64,
    pub buffers: f64,
    pub cached: f64,
    pub available: f64,
}

/// Swap usage at the end of the interval. Sizes in KiB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapUsage {
    pub used_percent: f64,
    pub total: f64,
    pub used: f64,
    pub free: f64,
}

/// One output record. Sections are `None` when disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Whole seconds since the run started.
    pub elapsed_secs: u64,
    pub cpu: Option<CpuUsage>,
    /// Per device, in device-list order.
    pub disk: Option<Vec<(String, DiskUsage)>>,
    pub memory: Option<MemoryUsage>,
    pub swap: Option<SwapUsage>,
}
