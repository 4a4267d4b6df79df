//! Raw system metric acquisition.
//!
//! This module provides the [`MetricsProvider`] interface the sampler depends
//! on, and a Linux implementation reading the `/proc` filesystem, with support
//! for mocking for testing on any platform.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            MetricsProvider (trait)          │
//! └──────────────────────┬──────────────────────┘
//!                        │
//!              ┌─────────▼─────────┐
//!              │  ProcfsProvider   │  /proc/stat, /proc/meminfo,
//!              │                   │  /proc/diskstats, /proc/self/mounts,
//!              └─────────┬─────────┘  /proc/filesystems
//!                        │
//!              ┌─────────▼─────────┐
//!              │ FileSystem (trait)│
//!              └─────────┬─────────┘
//!                ┌───────┴───────┐
//!         ┌──────▼──────┐ ┌──────▼──────┐
//!         │   RealFs    │ │   MockFs    │
//!         └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use gstat::collector::{MetricsProvider, MockFs, ProcfsProvider};
//!
//! let provider = ProcfsProvider::new(MockFs::typical_system(), "/proc");
//! let cpu = provider.cpu_times().unwrap();
//! assert!(cpu.total() > 0.0);
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{CollectError, ProcfsProvider};
pub use traits::{
    CpuTimes, DiskIoCounters, FileSystem, MetricsProvider, Partition, RealFs, SwapMemory,
    VirtualMemory,
};
