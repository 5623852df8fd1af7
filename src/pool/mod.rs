//! Job scheduling: the bounded worker pool and its fan-out/sequential siblings.
//!
//! Every mode funnels results into the same [`Aggregator`], so a run over `M`
//! jobs always reports `M` results whichever mode executed it.

pub mod collector;
pub mod modes;
pub mod tracker;
pub mod worker_pool;

#[cfg(test)]
mod hazard;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;

pub use collector::{AggregateStats, Aggregator, ResultStream, RunOutcome};
pub use tracker::{CompletionTracker, WorkerSummary};
pub use worker_pool::WorkerPool;

use crate::config::model::{Mode, PoolConfig};
use crate::error::ProbeError;
use crate::http_probe::prelude::*;

/// Execute `jobs` with the given scheduling mode and aggregate the results.
pub async fn run<P: Probe>(
    mode: Mode,
    config: PoolConfig,
    probe: Arc<P>,
    jobs: Vec<ProbeRequest>,
) -> RunOutcome {
    log::info!("Checking {} targets in {:?} mode", jobs.len(), mode);
    match mode {
        Mode::Pool => {
            let pool = WorkerPool::with_shared_probe(config, probe);
            log::info!(
                "Starting {} workers (job queue {}, result queue {})",
                pool.config().concurrency(),
                pool.config().job_queue_capacity(),
                pool.config().result_queue_capacity()
            );
            pool.run(jobs).await
        }
        Mode::FanOut => {
            Aggregator::drain(modes::fan_out(probe, jobs, config.result_queue_capacity())).await
        }
        Mode::Sequential => modes::sequential(probe.as_ref(), jobs).await,
    }
}

/// Run one probe, turning a panic into a failed result so the job is still
/// reported.
pub(crate) async fn run_job<P: Probe>(probe: &P, request: ProbeRequest) -> ProbeResult {
    let target = request.target.clone();
    let start = Instant::now();
    match AssertUnwindSafe(probe.probe(request)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(&*payload);
            log::error!("Probe of {target} panicked: {message}");
            ProbeResult::failure(target, ProbeError::Panicked(message), start.elapsed())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
