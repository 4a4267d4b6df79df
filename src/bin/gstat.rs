//! gstat - periodic system resource sampler.
//!
//! Prints one record per poll interval with CPU busy states, disk
//! utilization, memory and swap usage, until the run duration elapses or
//! SIGINT/SIGTERM arrives.
//!
//! Usage:
//!   gstat                          # sample every second, forever
//!   gstat --for 2s --poll 1s       # two records, then exit
//!   gstat --swap --total           # include swap, print the run average on exit
//!   gstat --device sda --cpu=false # disk sda and memory only

use std::io;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use gstat::collector::{ProcfsProvider, RealFs};
use gstat::config::{Config, DiskMode, DiskUtilBase, NonFinite, Sections};
use gstat::report::Reporter;
use gstat::runner::{self, RunError, Shutdown};
use gstat::sampler::Sampler;
use gstat::util::{format_duration, parse_duration};

/// Periodic CPU, disk, memory and swap sampler.
#[derive(Parser, Debug)]
#[command(name = "gstat", about = "Periodic system resource sampler", version)]
struct Args {
    /// How long to poll until exiting (e.g. "30s", "1h30m", "365d").
    #[arg(long = "for", value_name = "DURATION", default_value = "8760h", value_parser = parse_duration)]
    duration: Duration,

    /// How often to poll.
    #[arg(long, value_name = "DURATION", default_value = "1s", value_parser = parse_duration)]
    poll: Duration,

    /// Show CPU busy states.
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    cpu: bool,

    /// Show disk utilization.
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    disk: bool,

    /// Show memory usage.
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    mem: bool,

    /// Show swap usage.
    #[arg(long, default_value_t = false, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    swap: bool,

    /// Show the average over the whole run on exit.
    #[arg(long, default_value_t = false, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    total: bool,

    /// Name of a disk to report (repeatable). Default: all mounted block devices.
    #[arg(long = "device", value_name = "NAME")]
    devices: Vec<String>,

    /// Report disk read/write as KiB per second instead of KiB per interval.
    #[arg(long)]
    disk_rate: bool,

    /// Measure disk util over the last poll interval instead of the time since start.
    #[arg(long)]
    disk_util_interval: bool,

    /// Print `null` instead of NaN/Inf for values undefined over a zero-length interval.
    #[arg(long)]
    null_non_finite: bool,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace). Default is warn level.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            duration: self.duration,
            poll: self.poll,
            sections: Sections {
                cpu: self.cpu,
                disk: self.disk,
                mem: self.mem,
                swap: self.swap,
            },
            show_total: self.total,
            devices: self.devices,
            disk_mode: if self.disk_rate {
                DiskMode::Rate
            } else {
                DiskMode::Delta
            },
            disk_util: if self.disk_util_interval {
                DiskUtilBase::Interval
            } else {
                DiskUtilBase::SinceStart
            },
            non_finite: if self.null_non_finite {
                NonFinite::Null
            } else {
                NonFinite::Literal
            },
            proc_path: self.proc_path,
        }
    }
}

/// Initializes the tracing subscriber on stderr; stdout carries the records.
/// Default level is WARN. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("gstat={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Describes the enabled sections for logging.
fn describe_sections(sections: &Sections) -> String {
    let names: Vec<&str> = [
        (sections.cpu, "cpu"),
        (sections.disk, "disk"),
        (sections.mem, "memory"),
        (sections.swap, "swap"),
    ]
    .into_iter()
    .filter_map(|(enabled, name)| enabled.then_some(name))
    .collect();

    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = match args.into_config().validate() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("gstat {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: poll={}, for={}, sections={}, proc={}",
        format_duration(config.poll),
        format_duration(config.duration),
        describe_sections(&config.sections),
        config.proc_path
    );
    if config.sections.is_empty() {
        warn!("All sections disabled, only elapsed time will be reported");
    }
    #[cfg(not(target_os = "linux"))]
    warn!("Metrics are read from procfs, which this platform does not provide");

    let provider = ProcfsProvider::new(RealFs::new(), &config.proc_path);
    let sampler = match Sampler::from_config(provider, &config) {
        Ok(sampler) => sampler,
        Err(e) => {
            error!("Failed to discover disk devices: {}", e);
            std::process::exit(1);
        }
    };
    let reporter = Reporter::new(
        sampler.devices().to_vec(),
        config.disk_mode,
        config.disk_util,
    );

    // Setup graceful shutdown
    let (trigger, shutdown) = Shutdown::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        trigger.trigger();
    }) {
        warn!("Failed to set signal handler: {}", e);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match runner::run(&config, &sampler, &reporter, &shutdown, &mut out) {
        Ok(summary) => {
            debug!(
                "Exited ({:?}) after {} records over {}",
                summary.reason,
                summary.records,
                format_duration(summary.elapsed)
            );
        }
        Err(RunError::Output(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("stdout closed, exiting");
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_flags() {
        let config = Args::try_parse_from(["gstat"]).unwrap().into_config();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "gstat",
            "--for",
            "2s",
            "--poll",
            "500ms",
            "--cpu=false",
            "--swap",
            "--total",
            "--device",
            "sda",
            "--device",
            "/dev/nvme0n1",
            "--disk-rate",
            "--disk-util-interval",
            "--null-non-finite",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);

        let config = args.into_config();
        assert_eq!(config.duration, Duration::from_secs(2));
        assert_eq!(config.poll, Duration::from_millis(500));
        assert_eq!(
            config.sections,
            Sections {
                cpu: false,
                disk: true,
                mem: true,
                swap: true,
            }
        );
        assert!(config.show_total);
        assert_eq!(config.devices, vec!["sda", "/dev/nvme0n1"]);
        assert_eq!(config.disk_mode, DiskMode::Rate);
        assert_eq!(config.disk_util, DiskUtilBase::Interval);
        assert_eq!(config.non_finite, NonFinite::Null);
    }

    #[test]
    fn rejects_bad_duration() {
        assert!(Args::try_parse_from(["gstat", "--poll", "fast"]).is_err());
        assert!(Args::try_parse_from(["gstat", "--for", "-1s"]).is_err());
    }

    #[test]
    fn describe_sections_lists_enabled() {
        assert_eq!(describe_sections(&Sections::default()), "cpu, disk, memory");
        let none = Sections {
            cpu: false,
            disk: false,
            mem: false,
            swap: false,
        };
        assert_eq!(describe_sections(&none), "none");
    }
}
