//! Error types for oxycheck.
//!
//! Only configuration and job-source failures abort a run. Probe failures are
//! recorded on the individual `ProbeResult` and never stop the pool.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why a single probe failed. Stored on the result, never propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("probe panicked: {0}")]
    Panicked(String),
}

impl ProbeError {
    /// Short label used in logs and the report's error column.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Timeout(_) => "timeout",
            ProbeError::Connect(_) => "connect",
            ProbeError::InvalidTarget(_) => "invalid-target",
            ProbeError::Request(_) => "request",
            ProbeError::Panicked(_) => "panic",
        }
    }
}

/// Invalid settings. Raised before any worker starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("{0} capacity must be at least 1")]
    ZeroCapacity(&'static str),

    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure acquiring the job list.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read targets from {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed target on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Run-aborting errors.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
