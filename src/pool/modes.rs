//! The unbounded fan-out and the sequential baseline.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::collector::{Aggregator, ResultStream, RunOutcome};
use super::run_job;
use super::tracker::CompletionTracker;
use crate::http_probe::prelude::*;

/// Spawn one task per job. Concurrency is only limited by the number of jobs;
/// the bounded result channel still applies back-pressure to publishing.
pub fn fan_out<P: Probe>(
    probe: Arc<P>,
    jobs: Vec<ProbeRequest>,
    result_capacity: usize,
) -> ResultStream {
    let expected = jobs.len();
    let (tx, rx) = mpsc::channel(result_capacity.max(1));

    let mut tasks = JoinSet::new();
    for request in jobs {
        let probe = Arc::clone(&probe);
        let tx = tx.clone();
        tasks.spawn(async move {
            let result = run_job(probe.as_ref(), request).await;
            usize::from(tx.send(result).await.is_ok())
        });
    }

    ResultStream {
        receiver: rx,
        expected,
        producer: None,
        tracker: CompletionTracker::spawn(tasks, tx),
    }
}

/// Probe the jobs one after another. Results keep the input order.
pub async fn sequential<P: Probe>(probe: &P, jobs: Vec<ProbeRequest>) -> RunOutcome {
    let expected = jobs.len();
    let mut aggregator = Aggregator::with_capacity(expected);
    for request in jobs {
        aggregator.push(run_job(probe, request).await);
    }
    aggregator.finish(expected)
}
