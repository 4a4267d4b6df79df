//! The sampling loop.
//!
//! Two states: RUNNING, where a snapshot is taken and reported every poll
//! interval, and EXITING, entered when the configured duration has elapsed
//! or a shutdown was requested. On exit the averaged record over the whole
//! run is emitted if configured, then [`run`] returns.
//!
//! Shutdown requests travel over a single-slot channel. The loop waits for
//! the poll interval on that channel, so a request interrupts the wait at
//! once. Snapshots never leave the loop's thread; a request arriving while a
//! record is being computed is only observed after that record is written.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::time::Duration;

use tracing::{debug, info};

use crate::collector::{CollectError, MetricsProvider};
use crate::config::Config;
use crate::report::{Reporter, format_record, format_total_header};
use crate::sampler::{Sampler, Snapshot};

/// Sending half of the shutdown channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: SyncSender<()>,
}

impl ShutdownTrigger {
    /// Requests shutdown. Repeated requests collapse into one.
    pub fn trigger(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Receiving half of the shutdown channel, owned by the loop.
#[derive(Debug)]
pub struct Shutdown {
    rx: Receiver<()>,
}

impl Shutdown {
    /// Creates a connected trigger/receiver pair.
    pub fn channel() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = mpsc::sync_channel(1);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    /// Blocks for up to `timeout`. Returns `true` if shutdown was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                // No trigger left, nobody can request shutdown any more.
                std::thread::sleep(timeout);
                false
            }
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    DurationElapsed,
    Shutdown,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub reason: ExitReason,
    /// Regular records written, not counting the averaged one.
    pub records: u64,
    /// Time between the first and the last snapshot.
    pub elapsed: Duration,
}

/// Error type for run failures.
#[derive(Debug)]
pub enum RunError {
    /// A metrics read failed.
    Collect(CollectError),
    /// Writing a record failed.
    Output(io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Collect(e) => write!(f, "failed to collect metrics: {}", e),
            RunError::Output(e) => write!(f, "failed to write output: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Collect(e) => Some(e),
            RunError::Output(e) => Some(e),
        }
    }
}

impl From<CollectError> for RunError {
    fn from(e: CollectError) -> Self {
        RunError::Collect(e)
    }
}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        RunError::Output(e)
    }
}

/// Runs the sampling loop until the duration elapses or shutdown is requested.
///
/// Each record is written with a single `writeln!` and flushed, so readers
/// never see a partial line. Any metrics failure aborts the run immediately.
pub fn run<P, W>(
    config: &Config,
    sampler: &Sampler<P>,
    reporter: &Reporter,
    shutdown: &Shutdown,
    out: &mut W,
) -> Result<RunSummary, RunError>
where
    P: MetricsProvider,
    W: Write,
{
    let first = sampler.take_snapshot()?;
    let start = first.taken_at;
    let mut latest: Option<Snapshot> = None;
    let mut records: u64 = 0;

    info!("Starting sampling loop");

    let reason = loop {
        if start.elapsed() > config.duration {
            break ExitReason::DurationElapsed;
        }
        if shutdown.wait(config.poll) {
            break ExitReason::Shutdown;
        }

        let current = sampler.take_snapshot()?;
        let previous = latest.as_ref().unwrap_or(&first);
        let record = reporter.report(previous, &current, start);
        writeln!(out, "{}", format_record(&record, config.non_finite))?;
        out.flush()?;

        records += 1;
        debug!("Record #{} written", records);
        latest = Some(current);
    };

    let last = latest.as_ref().unwrap_or(&first);
    let elapsed = last.taken_at.saturating_duration_since(start);
    info!(
        "Stopping after {} records ({:?}), reason: {:?}",
        records, elapsed, reason
    );

    if config.show_total {
        let record = reporter.report(&first, last, start);
        writeln!(
            out,
            "{}\n{}",
            format_total_header(elapsed),
            format_record(&record, config.non_finite)
        )?;
        out.flush()?;
    }

    Ok(RunSummary {
        reason,
        records,
        elapsed,
    })
}
