//! Utility modules for gstat.

mod duration;

pub use duration::{DurationParseError, format_duration, parse_duration};
