//! Metrics provider backed by the Linux `/proc` filesystem.
//!
//! This module provides parsers for the `/proc` files the sampler needs and
//! [`ProcfsProvider`], which turns them into [`MetricsProvider`] results.
//!
//! [`MetricsProvider`]: crate::collector::MetricsProvider

pub mod parser;
mod provider;

pub use provider::ProcfsProvider;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading a `/proc` file.
    Io(std::io::Error),
    /// Parse error in a `/proc` file.
    Parse(String),
    /// `/proc/stat` has no aggregate `cpu` line.
    MissingCpuAggregate,
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
            CollectError::MissingCpuAggregate => write!(f, "no aggregate cpu line in stat"),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

impl From<parser::ParseError> for CollectError {
    fn from(e: parser::ParseError) -> Self {
        CollectError::Parse(e.message)
    }
}
