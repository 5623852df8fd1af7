use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;

use super::collector::{Aggregator, ResultStream, RunOutcome};
use super::run_job;
use super::tracker::CompletionTracker;
use crate::config::model::PoolConfig;
use crate::error::ConfigError;
use crate::http_probe::prelude::*;

type JobQueue = Arc<Mutex<mpsc::Receiver<ProbeRequest>>>;

/// A fixed number of workers pulling from one bounded job queue and
/// publishing onto one bounded result channel.
///
/// ```text
/// producer -> job queue -> worker 1..N -> result channel -> Aggregator
///                                 \-> CompletionTracker closes the channel
/// ```
pub struct WorkerPool<P> {
    config: PoolConfig,
    probe: Arc<P>,
}

impl<P: Probe> WorkerPool<P> {
    pub fn new(config: PoolConfig, probe: P) -> Self {
        Self::with_shared_probe(config, Arc::new(probe))
    }

    pub fn with_shared_probe(config: PoolConfig, probe: Arc<P>) -> Self {
        Self { config, probe }
    }

    /// Shorthand for a pool with default queue capacities. Fails fast on
    /// `concurrency == 0`.
    pub fn with_concurrency(concurrency: usize, probe: P) -> Result<Self, ConfigError> {
        Ok(Self::new(PoolConfig::new(concurrency)?, probe))
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Start the workers and the producer for `jobs` and hand back the result
    /// stream. The caller must drain it; workers block while it is full.
    pub fn spawn(&self, jobs: Vec<ProbeRequest>) -> ResultStream {
        let expected = jobs.len();
        let (job_tx, job_rx) = mpsc::channel(self.config.job_queue_capacity());
        let (result_tx, result_rx) = mpsc::channel(self.config.result_queue_capacity());
        let job_rx: JobQueue = Arc::new(Mutex::new(job_rx));

        let mut workers = JoinSet::new();
        for id in 1..=self.config.concurrency() {
            workers.spawn(worker_loop(
                id,
                Arc::clone(&self.probe),
                Arc::clone(&job_rx),
                result_tx.clone(),
            ));
        }
        // The workers now own the only receivers of the job queue.
        drop(job_rx);

        let producer = tokio::spawn(produce(jobs, job_tx));
        let tracker = CompletionTracker::spawn(workers, result_tx);

        ResultStream {
            receiver: result_rx,
            expected,
            producer: Some(producer),
            tracker,
        }
    }

    /// Run `jobs` to completion and aggregate every result.
    pub async fn run(&self, jobs: Vec<ProbeRequest>) -> RunOutcome {
        Aggregator::drain(self.spawn(jobs)).await
    }
}

/// Enqueue every job, then close the queue by dropping the only sender.
async fn produce(jobs: Vec<ProbeRequest>, queue: mpsc::Sender<ProbeRequest>) -> usize {
    let mut enqueued = 0;
    for job in jobs {
        if queue.send(job).await.is_err() {
            log::warn!("All workers stopped before the job queue was filled");
            break;
        }
        enqueued += 1;
    }
    drop(queue);
    log::debug!("Enqueued {enqueued} jobs, job queue closed");
    enqueued
}

async fn worker_loop<P: Probe>(
    id: usize,
    probe: Arc<P>,
    jobs: JobQueue,
    results: mpsc::Sender<ProbeResult>,
) -> usize {
    let mut handled = 0;
    loop {
        // Hold the queue lock only while waiting for the next job.
        let next = jobs.lock().await.recv().await;
        let Some(request) = next else {
            break;
        };

        log::debug!("Worker {id} probing {}", request.target);
        let result = run_job(probe.as_ref(), request).await;
        handled += 1;

        if results.send(result).await.is_err() {
            log::warn!("Worker {id}: result channel dropped, stopping");
            break;
        }
    }
    log::debug!("Worker {id} exiting after {handled} jobs");
    handled
}
