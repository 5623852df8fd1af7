//! oxycheck: batch URL health checks on a bounded worker pool.
//!
//! Targets come from a line-oriented [`source::JobSource`], are probed by
//! `concurrency` workers sharing one job queue, and every result flows through
//! a single channel into the [`pool::Aggregator`]. A run over `M` targets
//! always reports exactly `M` results.

pub mod config;
pub mod error;
pub mod http_probe;
pub mod pool;
pub mod report;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{CheckError, ConfigError, ProbeError, Result, SourceError};
