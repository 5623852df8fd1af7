use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::Client;

use super::error_chain;
use super::result::{ProbeRequest, ProbeResult};
use crate::config::model::ProbeSettings;
use crate::error::{ConfigError, ProbeError};

/// One network check. Implementations must not share mutable state between
/// invocations; the pool calls `probe` from many workers at once.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, request: ProbeRequest) -> impl Future<Output = ProbeResult> + Send;
}

/// HTTP GET prober backed by a single shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    /// Build the prober from the probe settings. The timeout is applied to the
    /// whole request, connect included.
    pub fn new(settings: &ProbeSettings) -> Result<Self, ConfigError> {
        if settings.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        let client = Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            timeout: settings.timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Probe for HttpProber {
    async fn probe(&self, request: ProbeRequest) -> ProbeResult {
        probe_url(&self.client, self.timeout, &request.target).await
    }
}

/// Issue a GET against `url` and record the status line and elapsed time.
/// The response body is never read.
pub async fn probe_url(client: &Client, timeout: Duration, url: &str) -> ProbeResult {
    let start = Instant::now();
    let status_result = client.get(url).send().await;
    let latency = start.elapsed();

    match status_result {
        Ok(resp) => ProbeResult::success(url, resp.status().as_u16(), latency),
        Err(err) => {
            let error = classify(&err, timeout);
            log::debug!("Probe of {url} failed ({}) after {latency:?}: {error}", error.kind());
            ProbeResult::failure(url, error, latency)
        }
    }
}

fn classify(err: &reqwest::Error, timeout: Duration) -> ProbeError {
    if err.is_timeout() {
        ProbeError::Timeout(timeout)
    } else if err.is_builder() {
        ProbeError::InvalidTarget(error_chain(err))
    } else if err.is_connect() {
        ProbeError::Connect(error_chain(err))
    } else {
        ProbeError::Request(error_chain(err))
    }
}
