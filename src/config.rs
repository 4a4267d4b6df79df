//! Run configuration.
//!
//! Built once at startup from the command line and passed by reference to
//! the sampler, reporter and runner. Nothing reads configuration from globals.

use std::time::Duration;

/// Default total run time: 365 days.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(365 * 24 * 3600);

/// Default interval between samples.
pub const DEFAULT_POLL: Duration = Duration::from_secs(1);

/// Default procfs mount point.
pub const DEFAULT_PROC_PATH: &str = "/proc";

/// Which metric sections are sampled and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub cpu: bool,
    pub disk: bool,
    pub mem: bool,
    pub swap: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            cpu: true,
            disk: true,
            mem: true,
            swap: false,
        }
    }
}

impl Sections {
    /// Returns true if no section is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.cpu || self.disk || self.mem || self.swap)
    }
}

/// How disk `read`/`write` values are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiskMode {
    /// KiB transferred during the interval (not normalized by time).
    #[default]
    Delta,
    /// KiB per second over the interval.
    Rate,
}

/// Time span disk `util` is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiskUtilBase {
    /// Time since the run started, so `util` shrinks as the run grows.
    #[default]
    SinceStart,
    /// Time between the two snapshots being compared.
    Interval,
}

/// Rendering of NaN and infinite values (zero-length intervals).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonFinite {
    /// `NaN`, `+Inf`, `-Inf`.
    #[default]
    Literal,
    /// `null`.
    Null,
}

/// Error type for invalid configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Poll interval of zero would spin.
    ZeroPollInterval,
    /// A `--device` value was empty.
    EmptyDeviceName,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroPollInterval => write!(f, "poll interval must be greater than zero"),
            ConfigError::EmptyDeviceName => write!(f, "device name must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Total run time before exiting.
    pub duration: Duration,
    /// Interval between samples.
    pub poll: Duration,
    pub sections: Sections,
    /// Emit the averaged record on exit.
    pub show_total: bool,
    /// Disk devices to report. Empty means auto-discover at startup.
    pub devices: Vec<String>,
    pub disk_mode: DiskMode,
    pub disk_util: DiskUtilBase,
    pub non_finite: NonFinite,
    /// Path to the procfs mount point.
    pub proc_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            poll: DEFAULT_POLL,
            sections: Sections::default(),
            show_total: false,
            devices: Vec::new(),
            disk_mode: DiskMode::default(),
            disk_util: DiskUtilBase::default(),
            non_finite: NonFinite::default(),
            proc_path: DEFAULT_PROC_PATH.to_string(),
        }
    }
}

impl Config {
    /// Checks the invariants the sampling loop relies on.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.poll.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.devices.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::EmptyDeviceName);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.duration, Duration::from_secs(31_536_000));
        assert_eq!(config.poll, Duration::from_secs(1));
        assert!(config.sections.cpu);
        assert!(config.sections.disk);
        assert!(config.sections.mem);
        assert!(!config.sections.swap);
        assert!(!config.show_total);
        assert!(config.devices.is_empty());
        assert_eq!(config.disk_mode, DiskMode::Delta);
        assert_eq!(config.disk_util, DiskUtilBase::SinceStart);
        assert_eq!(config.non_finite, NonFinite::Literal);
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let config = Config {
            poll: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));

        let config = Config {
            devices: vec!["sda".to_string(), " ".to_string()],
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyDeviceName));
    }

    #[test]
    fn test_sections_is_empty() {
        assert!(!Sections::default().is_empty());
        let none = Sections {
            cpu: false,
            disk: false,
            mem: false,
            swap: false,
        };
        assert!(none.is_empty());
    }
}
