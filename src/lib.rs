//! gstat - periodic system resource sampler.
//!
//! Polls CPU, disk I/O, memory and swap counters at a fixed interval and
//! prints delta-based utilization records, one line per sample.
//!
//! - `collector`: metrics provider interface and its `/proc` implementation
//! - `sampler`: snapshots of the enabled sections
//! - `report`: delta computation and record rendering
//! - `runner`: the sampling loop and shutdown handling
//! - `config`: immutable run configuration
//! - `util`: duration parsing and display

pub mod collector;
pub mod config;
pub mod report;
pub mod runner;
pub mod sampler;
pub mod util;
