//! Takes snapshots of the enabled metric sections.
//!
//! The sampler owns the metrics provider and the device list, both fixed for
//! the lifetime of the process. Any provider failure is returned to the
//! caller unchanged; there is no retry and no partial snapshot.

mod snapshot;

pub use snapshot::Snapshot;

use std::time::Instant;

use tracing::{debug, info};

use crate::collector::{CollectError, MetricsProvider};
use crate::config::{Config, Sections};

/// Filesystem types whose mounts are never reported (loop-mounted images).
const SKIPPED_FSTYPES: &[&str] = &["squashfs"];

/// Lists the devices backing mounted block filesystems, in mount order.
///
/// Loop-mounted images are skipped and a device mounted more than once
/// (bind mounts) is listed once.
pub fn discover_devices<P: MetricsProvider>(provider: &P) -> Result<Vec<String>, CollectError> {
    let mut devices: Vec<String> = Vec::new();

    for part in provider.partitions(true)? {
        if SKIPPED_FSTYPES.contains(&part.fstype.as_str()) {
            debug!("skipping {} ({})", part.device, part.fstype);
            continue;
        }
        if !devices.contains(&part.device) {
            devices.push(part.device);
        }
    }

    Ok(devices)
}

/// Reads snapshots from a [`MetricsProvider`].
pub struct Sampler<P: MetricsProvider> {
    provider: P,
    devices: Vec<String>,
    sections: Sections,
}

impl<P: MetricsProvider> Sampler<P> {
    /// Creates a sampler for an explicit device list.
    pub fn new(provider: P, devices: Vec<String>, sections: Sections) -> Self {
        Self {
            provider,
            devices,
            sections,
        }
    }

    /// Creates a sampler from the run configuration.
    ///
    /// When the disk section is enabled and no device was configured, the
    /// device list is discovered once here and never refreshed.
    pub fn from_config(provider: P, config: &Config) -> Result<Self, CollectError> {
        let devices = if config.sections.disk && config.devices.is_empty() {
            let found = discover_devices(&provider)?;
            info!("Discovered {} disk devices: {}", found.len(), found.join(", "));
            found
        } else {
            config.devices.clone()
        };

        Ok(Self::new(provider, devices, config.sections))
    }

    /// The fixed, ordered device list.
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// Reads every enabled section once.
    pub fn take_snapshot(&self) -> Result<Snapshot, CollectError> {
        let sections = self.sections;
        let cpu = sections
            .cpu
            .then(|| self.provider.cpu_times())
            .transpose()?;
        let disk = sections
            .disk
            .then(|| self.provider.disk_io_counters(&self.devices))
            .transpose()?;
        let memory = sections
            .mem
            .then(|| self.provider.virtual_memory())
            .transpose()?;
        let swap = sections
            .swap
            .then(|| self.provider.swap_memory())
            .transpose()?;

        Ok(Snapshot {
            taken_at: Instant::now(),
            cpu,
            disk,
            memory,
            swap,
        })
    }
}
