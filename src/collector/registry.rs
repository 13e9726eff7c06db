//! Worker registry for managing scrape job lifecycle.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::collector::worker::{Worker, WorkerHandle};
use crate::collector::{CollectorError, Fetcher, Forwarder};
use crate::job::Job;

/// Default timeout for graceful shutdown (5 seconds).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Metadata about an active job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    /// Registry-assigned id, increasing in activation order.
    pub id: u64,
    /// Job name.
    pub name: String,
    /// Scraped endpoint.
    pub url: String,
    /// Collector address batches are sent to.
    pub target: String,
    /// Polling interval.
    pub interval: Duration,
}

impl JobInfo {
    fn new(id: u64, job: &Job) -> Self {
        Self {
            id,
            name: job.name.clone(),
            url: job.url.clone(),
            target: job.target.clone(),
            interval: job.interval,
        }
    }
}

struct Entry {
    info: JobInfo,
    handle: WorkerHandle,
}

/// Registry owning one worker per job.
///
/// Job names are tags, not keys: two jobs may share a name and each still
/// gets its own worker. Workers share the fetcher and forwarder but no mutable
/// state; the registry only holds their cancellation handles.
pub struct WorkerRegistry {
    fetcher: Arc<dyn Fetcher>,
    forwarder: Arc<dyn Forwarder>,
    workers: RwLock<BTreeMap<u64, Entry>>,
    next_id: AtomicU64,
}

impl WorkerRegistry {
    /// Create an empty registry.
    pub fn new(fetcher: Arc<dyn Fetcher>, forwarder: Arc<dyn Forwarder>) -> Self {
        Self {
            fetcher,
            forwarder,
            workers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field(
                "job_count",
                &self.workers.try_read().map(|w| w.len()).unwrap_or(0),
            )
            .finish_non_exhaustive()
    }
}

impl WorkerRegistry {
    /// Validate a job and start its worker.
    ///
    /// # Errors
    /// Returns `CollectorError::Config` if the job is invalid.
    pub async fn activate(&self, job: Job) -> Result<JobInfo, CollectorError> {
        job.validate()
            .map_err(|e| CollectorError::Config(e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let info = JobInfo::new(id, &job);
        let handle = Worker::new(job, Arc::clone(&self.fetcher), Arc::clone(&self.forwarder))
            .spawn();
        self.workers.write().await.insert(
            id,
            Entry {
                info: info.clone(),
                handle,
            },
        );

        tracing::info!(
            job = %info.name,
            job_id = info.id,
            url = %info.url,
            target_addr = %info.target,
            interval = ?info.interval,
            "Job activated"
        );
        Ok(info)
    }

    /// List all active jobs in activation order.
    pub async fn list_jobs(&self) -> Vec<JobInfo> {
        self.workers
            .read()
            .await
            .values()
            .map(|e| e.info.clone())
            .collect()
    }

    /// Get the number of active jobs.
    pub async fn job_count(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Stop every job named `name` and wait for their workers to exit.
    ///
    /// Other jobs keep running. Returns the number of workers stopped.
    ///
    /// # Errors
    /// Returns `CollectorError::Config` if no active job has that name.
    pub async fn cancel(&self, name: &str) -> Result<usize, CollectorError> {
        let entries: Vec<Entry> = {
            let mut workers = self.workers.write().await;
            let ids: Vec<u64> = workers
                .iter()
                .filter(|(_, e)| e.info.name == name)
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| workers.remove(id)).collect()
        };

        if entries.is_empty() {
            return Err(CollectorError::Config(format!(
                "job '{}' is not active",
                name
            )));
        }

        let count = entries.len();
        for mut entry in entries {
            entry.handle.cancel();
            entry.handle.join().await;
            tracing::info!(job = %name, job_id = entry.info.id, "Job cancelled");
        }
        Ok(count)
    }

    /// Block until every worker active at call time has terminated.
    ///
    /// Workers only stop when cancelled, so without a shutdown this never
    /// returns.
    pub async fn wait(&self) {
        let done: Vec<_> = self
            .workers
            .read()
            .await
            .values()
            .map(|e| e.handle.done())
            .collect();

        for mut rx in done {
            // A dropped sender means the task is gone, which counts as done.
            let _ = rx.wait_for(|d| *d).await;
        }
    }

    /// Gracefully stop every worker with the default timeout.
    pub async fn shutdown(self) -> Result<(), CollectorError> {
        self.shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT).await
    }

    /// Signal every worker, then wait for in-flight cycles up to `timeout`.
    ///
    /// Workers still running when the timeout elapses are aborted.
    ///
    /// # Errors
    /// Returns `CollectorError::Timeout` if some worker had to be aborted.
    pub async fn shutdown_with_timeout(self, timeout: Duration) -> Result<(), CollectorError> {
        let mut entries: Vec<Entry> = self.workers.into_inner().into_values().collect();
        let job_count = entries.len();

        for entry in &mut entries {
            entry.handle.cancel();
        }

        let done: Vec<_> = entries.iter().map(|e| e.handle.done()).collect();
        let stopped = tokio::time::timeout(timeout, async {
            for mut rx in done {
                let _ = rx.wait_for(|d| *d).await;
            }
        })
        .await;

        if stopped.is_err() {
            let stuck: Vec<_> = entries
                .iter()
                .filter(|e| !e.handle.is_finished())
                .map(|e| e.info.name.as_str())
                .collect();
            tracing::warn!(job_count, ?stuck, "Worker shutdown timed out, aborting");
            for entry in &entries {
                entry.handle.abort();
            }
            return Err(CollectorError::Timeout);
        }

        tracing::info!(job_count, "Worker shutdown complete");
        Ok(())
    }
}
