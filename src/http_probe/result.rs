use std::time::Duration;

use crate::error::ProbeError;

/// A single target to probe. Consumed by the worker that takes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub target: String,
}

impl ProbeRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// Outcome of one probe attempt.
///
/// Exactly one of `status_code` and `error` is set. `latency` is the wall-clock
/// time spent on the attempt, failed attempts included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub target: String,
    pub status_code: Option<u16>,
    pub latency: Duration,
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    pub fn success(target: impl Into<String>, status_code: u16, latency: Duration) -> Self {
        Self {
            target: target.into(),
            status_code: Some(status_code),
            latency,
            error: None,
        }
    }

    pub fn failure(target: impl Into<String>, error: ProbeError, latency: Duration) -> Self {
        Self {
            target: target.into(),
            status_code: None,
            latency,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
