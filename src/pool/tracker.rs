use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

/// What the tracker saw while joining the workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Workers that exited normally.
    pub workers: usize,
    /// Jobs those workers reported as handled.
    pub jobs_handled: usize,
    /// Workers that panicked or were cancelled.
    pub crashed: usize,
}

/// Closes the result channel once every worker has exited.
///
/// The tracker runs as its own task and owns the original result `Sender`;
/// workers only ever hold clones. Dropping the original after the last join is
/// the one and only close, and ownership makes a second close impossible.
pub struct CompletionTracker {
    handle: JoinHandle<WorkerSummary>,
}

impl CompletionTracker {
    pub fn spawn<T>(mut workers: JoinSet<usize>, closer: mpsc::Sender<T>) -> Self
    where
        T: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut summary = WorkerSummary::default();
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok(handled) => {
                        summary.workers += 1;
                        summary.jobs_handled += handled;
                    }
                    Err(e) => {
                        log::error!("Worker task failed: {e}");
                        summary.crashed += 1;
                    }
                }
            }
            drop(closer);
            log::debug!("All workers exited, result channel closed");
            summary
        });
        Self { handle }
    }

    /// Wait for the tracker task itself.
    pub async fn wait(self) -> WorkerSummary {
        match self.handle.await {
            Ok(summary) => summary,
            Err(e) => {
                log::error!("Completion tracker failed: {e}");
                WorkerSummary::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_channel_closes_only_after_all_workers_exit() {
        let (tx, mut rx) = mpsc::channel::<usize>(8);
        let mut workers = JoinSet::new();
        for i in 0..4_usize {
            let tx = tx.clone();
            workers.spawn(async move {
                tokio::time::sleep(Duration::from_millis(5 * i as u64)).await;
                tx.send(i).await.expect("receiver alive");
                1
            });
        }
        let tracker = CompletionTracker::spawn(workers, tx);

        let mut seen = Vec::new();
        while let Some(i) = rx.recv().await {
            seen.push(i);
        }
        seen.sort_unstable();

        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(
            tracker.wait().await,
            WorkerSummary {
                workers: 4,
                jobs_handled: 4,
                crashed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_zero_workers_closes_immediately() {
        let (tx, mut rx) = mpsc::channel::<()>(1);
        let tracker = CompletionTracker::spawn(JoinSet::new(), tx);

        assert!(rx.recv().await.is_none());
        assert_eq!(tracker.wait().await, WorkerSummary::default());
    }

    #[tokio::test]
    async fn test_crashed_worker_still_closes_channel() {
        let (tx, mut rx) = mpsc::channel::<()>(1);
        let mut workers: JoinSet<usize> = JoinSet::new();
        let worker_tx = tx.clone();
        workers.spawn(async move {
            let _tx = worker_tx;
            panic!("worker blew up");
        });
        workers.spawn(async { 0 });
        let tracker = CompletionTracker::spawn(workers, tx);

        assert!(rx.recv().await.is_none());
        let summary = tracker.wait().await;
        assert_eq!(summary.crashed, 1);
        assert_eq!(summary.workers, 1);
    }
}
