use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::tracker::CompletionTracker;
use crate::http_probe::result::ProbeResult;

/// Running totals over the results seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_latency_of_succeeded: Duration,
}

impl AggregateStats {
    /// Fold one result into the totals.
    pub fn record(&mut self, result: &ProbeResult) {
        self.total += 1;
        if result.error.is_some() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
            self.total_latency_of_succeeded += result.latency;
        }
    }

    /// Mean latency of the successful probes, `None` when there were none.
    pub fn average_latency(&self) -> Option<Duration> {
        if self.succeeded == 0 {
            return None;
        }
        let nanos = self.total_latency_of_succeeded.as_nanos() / self.succeeded as u128;
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Results in arrival order.
    pub results: Vec<ProbeResult>,
    pub stats: AggregateStats,
    /// Number of jobs submitted.
    pub expected: usize,
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        self.stats.total == self.expected
    }
}

/// The receiving end of a running pipeline.
///
/// The channel reports closed only after the completion tracker has seen every
/// worker exit, so draining it to the end observes every result.
pub struct ResultStream {
    pub(crate) receiver: mpsc::Receiver<ProbeResult>,
    pub(crate) expected: usize,
    pub(crate) producer: Option<JoinHandle<usize>>,
    pub(crate) tracker: CompletionTracker,
}

/// Single consumer of the result channel.
#[derive(Debug, Default)]
pub struct Aggregator {
    results: Vec<ProbeResult>,
    stats: AggregateStats,
}

impl Aggregator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            stats: AggregateStats::default(),
        }
    }

    pub fn push(&mut self, result: ProbeResult) {
        self.stats.record(&result);
        self.results.push(result);
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn finish(self, expected: usize) -> RunOutcome {
        RunOutcome {
            results: self.results,
            stats: self.stats,
            expected,
        }
    }

    /// Drain `stream` until its channel is closed, then reap the producer and
    /// the tracker.
    pub async fn drain(stream: ResultStream) -> RunOutcome {
        let ResultStream {
            mut receiver,
            expected,
            producer,
            tracker,
        } = stream;

        let mut aggregator = Aggregator::with_capacity(expected);
        // `None` means closed: every sender is gone, not merely an empty buffer.
        while let Some(result) = receiver.recv().await {
            aggregator.push(result);
        }

        let summary = tracker.wait().await;
        log::debug!(
            "{} workers finished, {} jobs handled, {} crashed",
            summary.workers,
            summary.jobs_handled,
            summary.crashed
        );

        if let Some(producer) = producer {
            match producer.await {
                Ok(enqueued) if enqueued != expected => {
                    log::warn!("Only {enqueued} of {expected} jobs were enqueued");
                }
                Ok(_) => {}
                Err(e) => log::error!("Job producer failed: {e}"),
            }
        }

        let outcome = aggregator.finish(expected);
        if !outcome.is_complete() {
            log::error!(
                "Received {} results for {} jobs",
                outcome.stats.total,
                outcome.expected
            );
        }
        outcome
    }
}
