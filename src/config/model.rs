use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
pub const DEFAULT_TARGETS_FILE: &str = "urls.txt";

/// How the jobs are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Fixed pool of `concurrency` workers sharing one job queue.
    #[default]
    Pool,
    /// One task per job, no upper bound on in-flight probes.
    FanOut,
    /// One job at a time, in input order.
    Sequential,
}

/// The full oxycheck configuration.
/// Every field may be omitted from the YAML file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Number of pool workers. Must be at least 1.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-probe timeout in milliseconds, connect included.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Capacity of the bounded job queue.
    #[serde(default = "default_queue_capacity")]
    pub job_queue_capacity: usize,

    /// Capacity of the bounded result channel. Workers block when it is full.
    #[serde(default = "default_queue_capacity")]
    pub result_queue_capacity: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default)]
    pub mode: Mode,

    /// Abort on malformed target lines instead of probing them.
    #[serde(default)]
    pub strict_source: bool,

    /// File with one target per line.
    #[serde(default = "default_targets_file")]
    pub targets_file: PathBuf,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
            job_queue_capacity: default_queue_capacity(),
            result_queue_capacity: default_queue_capacity(),
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
            mode: Mode::default(),
            strict_source: false,
            targets_file: default_targets_file(),
        }
    }
}

impl CheckConfig {
    pub fn pool_config(&self) -> Result<PoolConfig, ConfigError> {
        PoolConfig::new(self.concurrency)?
            .with_queue_capacities(self.job_queue_capacity, self.result_queue_capacity)
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            timeout: Duration::from_millis(self.timeout_ms),
            user_agent: self.user_agent.clone(),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

/// Validated worker pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    concurrency: usize,
    job_queue_capacity: usize,
    result_queue_capacity: usize,
}

impl PoolConfig {
    /// Fails with `ConfigError::ZeroConcurrency` when `concurrency == 0`.
    pub fn new(concurrency: usize) -> Result<Self, ConfigError> {
        if concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(Self {
            concurrency,
            job_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            result_queue_capacity: DEFAULT_QUEUE_CAPACITY,
        })
    }

    pub fn with_queue_capacities(mut self, jobs: usize, results: usize) -> Result<Self, ConfigError> {
        if jobs == 0 {
            return Err(ConfigError::ZeroCapacity("job queue"));
        }
        if results == 0 {
            return Err(ConfigError::ZeroCapacity("result queue"));
        }
        self.job_queue_capacity = jobs;
        self.result_queue_capacity = results;
        Ok(self)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn job_queue_capacity(&self) -> usize {
        self.job_queue_capacity
    }

    pub fn result_queue_capacity(&self) -> usize {
        self.result_queue_capacity
    }
}

/// Settings for the HTTP client shared by all probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept_invalid_certs: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_user_agent() -> String {
    format!("oxycheck/{}", env!("CARGO_PKG_VERSION"))
}

fn default_targets_file() -> PathBuf {
    PathBuf::from(DEFAULT_TARGETS_FILE)
}
