//! Test-only contrast for the aggregation layer.
//!
//! `RacyLog` appends with a read-length / write-slot / store-length sequence
//! and no coordination around it. Each memory access is individually safe, but
//! two workers that read the same length write the same slot and one result is
//! silently overwritten. `LockedLog` is the fix: the lock covers the whole
//! append and nothing else.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Barrier;
use tokio::task::JoinSet;

use super::run_job;
use crate::http_probe::prelude::*;

/// Something workers append results to directly.
trait SharedLog: Send + Sync + 'static {
    fn append(&self, result: ProbeResult) -> impl Future<Output = ()> + Send;
    fn recorded(&self) -> usize;
}

/// Unsynchronized append into a pre-sized slot vector.
struct RacyLog {
    len: AtomicUsize,
    slots: Vec<Mutex<Option<ProbeResult>>>,
}

impl RacyLog {
    fn new(capacity: usize) -> Self {
        Self {
            len: AtomicUsize::new(0),
            slots: (0..capacity).map(|_| Mutex::new(None)).collect(),
        }
    }
}

impl SharedLog for RacyLog {
    async fn append(&self, result: ProbeResult) {
        let idx = self.len.load(Ordering::Relaxed);
        // other workers can read the same length while this one is parked
        tokio::task::yield_now().await;
        if let Some(slot) = self.slots.get(idx) {
            *slot.lock().unwrap() = Some(result);
        }
        self.len.store(idx + 1, Ordering::Relaxed);
    }

    fn recorded(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }
}

/// Mutex-guarded append, lock held for the push only.
struct LockedLog {
    results: Mutex<Vec<ProbeResult>>,
}

impl SharedLog for LockedLog {
    async fn append(&self, result: ProbeResult) {
        tokio::task::yield_now().await;
        self.results.lock().unwrap().push(result);
    }

    fn recorded(&self) -> usize {
        self.results.lock().unwrap().len()
    }
}

/// One task per job, each appending straight into `log`. The appends start
/// together once every job has finished.
async fn run_into<P: Probe, L: SharedLog>(
    probe: Arc<P>,
    jobs: Vec<ProbeRequest>,
    log: Arc<L>,
) -> usize {
    let barrier = Arc::new(Barrier::new(jobs.len()));
    let mut tasks = JoinSet::new();
    for request in jobs {
        let probe = Arc::clone(&probe);
        let log = Arc::clone(&log);
        let barrier = Arc::clone(&barrier);
        tasks.spawn(async move {
            let result = run_job(probe.as_ref(), request).await;
            barrier.wait().await;
            log.append(result).await;
        });
    }
    while tasks.join_next().await.is_some() {}
    log.recorded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::WorkerPool;
    use crate::test_support::ok_server;

    const TRIALS: usize = 100;
    const TARGETS: usize = 5;

    fn targets(url: &str) -> Vec<ProbeRequest> {
        (0..TARGETS).map(|_| ProbeRequest::new(url)).collect()
    }

    fn prober() -> Arc<HttpProber> {
        Arc::new(HttpProber::new(&Default::default()).expect("client should build"))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unsynchronized_append_loses_results() {
        let server = ok_server().await;
        let probe = prober();

        let mut lossy_trials = 0;
        for _ in 0..TRIALS {
            let log = Arc::new(RacyLog::new(TARGETS));
            let recorded = run_into(Arc::clone(&probe), targets(&server.url()), log).await;
            assert!(recorded <= TARGETS);
            if recorded < TARGETS {
                lossy_trials += 1;
            }
        }

        assert!(
            lossy_trials > 0,
            "expected at least one of {TRIALS} trials to lose a result"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_locked_append_keeps_every_result() {
        let server = ok_server().await;
        let probe = prober();

        for _ in 0..TRIALS {
            let log = Arc::new(LockedLog {
                results: Mutex::new(Vec::new()),
            });
            let recorded = run_into(Arc::clone(&probe), targets(&server.url()), log).await;
            assert_eq!(recorded, TARGETS);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_channel_pool_keeps_every_result() {
        let server = ok_server().await;
        let probe = prober();

        for _ in 0..TRIALS {
            let pool = WorkerPool::with_shared_probe(
                crate::config::PoolConfig::new(TARGETS).expect("valid concurrency"),
                Arc::clone(&probe),
            );
            let outcome = pool.run(targets(&server.url())).await;
            assert_eq!(outcome.stats.total, TARGETS);
            assert_eq!(outcome.stats.succeeded, TARGETS);
        }
    }
}
