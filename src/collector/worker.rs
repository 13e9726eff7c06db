//! Per-job scrape worker.
//!
//! A worker owns one job and runs fetch → parse → forward on every tick of its
//! own interval. Failures are contained to the cycle that hit them: the error
//! is logged and the worker waits for the next tick.
//!
//! # Lifecycle
//!
//! `Idle` (constructed) → `Running` ([`Worker::spawn`]) → `Stopped` (cancel
//! signal received, or the [`WorkerHandle`] dropped). A cycle that is already
//! in flight when cancellation arrives runs to completion first.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::collector::{Delivery, Fetcher, Forwarder};
use crate::exposition;
use crate::job::Job;

/// Result of a single fetch → parse → forward cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Records were parsed and handed to the forwarder.
    Forwarded(Delivery),
    /// The endpoint could not be scraped; nothing was forwarded.
    FetchFailed,
    /// The batch could not be delivered.
    ForwardFailed,
}

/// Scrape loop for a single job.
pub struct Worker {
    job: Job,
    fetcher: Arc<dyn Fetcher>,
    forwarder: Arc<dyn Forwarder>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("job", &self.job)
            .finish_non_exhaustive()
    }
}

impl Worker {
    pub fn new(job: Job, fetcher: Arc<dyn Fetcher>, forwarder: Arc<dyn Forwarder>) -> Self {
        Self {
            job,
            fetcher,
            forwarder,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Run one fetch → parse → forward cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let job = &self.job;
        let start = Instant::now();

        let body = match self.fetcher.fetch(job).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    job = %job.name,
                    url = %job.url,
                    error = %e,
                    "Fetch failed, skipping cycle"
                );
                return CycleOutcome::FetchFailed;
            }
        };

        let records = exposition::parse(&body, job);

        match self.forwarder.forward(&job.target, &records).await {
            Ok(delivery) => {
                tracing::debug!(
                    job = %job.name,
                    records = records.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Cycle completed"
                );
                tracing::trace!(job = %job.name, "{}", delivery);
                CycleOutcome::Forwarded(delivery)
            }
            Err(e) => {
                tracing::error!(
                    job = %job.name,
                    target_addr = %job.target,
                    records = records.len(),
                    error = %e,
                    "Forward failed"
                );
                CycleOutcome::ForwardFailed
            }
        }
    }

    /// Tick until `cancel` fires or its sender is dropped.
    ///
    /// The first tick fires one interval after the call. Ticks missed while a
    /// cycle overran collapse into one late tick; later ticks stay on the
    /// original grid. A pending cancel wins over a due tick.
    pub async fn run(self, mut cancel: oneshot::Receiver<()>) {
        let period = self.job.interval;
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(job = %self.job.name, interval = ?period, "Worker started");

        loop {
            tokio::select! {
                biased;

                _ = &mut cancel => break,
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        tracing::info!(job = %self.job.name, "Worker stopped");
    }

    /// Start the loop on a new task.
    pub fn spawn(self) -> WorkerHandle {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (done_tx, done_rx) = watch::channel(false);
        let name = self.job.name.clone();

        let task = tokio::spawn(async move {
            self.run(cancel_rx).await;
            let _ = done_tx.send(true);
        });

        WorkerHandle {
            name,
            cancel: Some(cancel_tx),
            done: done_rx,
            task,
        }
    }
}

/// Cancellation handle for a running worker.
///
/// Dropping the handle stops the worker after its current cycle.
#[derive(Debug)]
pub struct WorkerHandle {
    name: String,
    cancel: Option<oneshot::Sender<()>>,
    done: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signal the worker to stop. Calling more than once is a no-op.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// A receiver that flips to `true` once the worker loop has exited.
    ///
    /// The sender is dropped without flipping if the task panics.
    pub fn done(&self) -> watch::Receiver<bool> {
        self.done.clone()
    }

    /// Wait for the worker task to exit.
    pub async fn join(mut self) {
        if let Err(e) = (&mut self.task).await {
            tracing::error!(job = %self.name, error = %e, "Worker task failed");
        }
    }

    /// Abort the task without waiting for the current cycle.
    pub fn abort(&self) {
        self.task.abort();
    }
}
