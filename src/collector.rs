//! Collector Layer
//!
//! Scrape framework: one worker per job, each ticking on its own interval and
//! running fetch → parse → forward. Each worker runs in its own Tokio task.
//!
//! # Architecture
//!
//! - [`Fetcher`]: Obtains raw exposition text ([`HttpFetcher`])
//! - [`Forwarder`]: Ships parsed batches downstream ([`TcpForwarder`])
//! - [`Worker`]: The per-job tick loop, stopped via its [`WorkerHandle`]
//! - [`WorkerRegistry`]: Activates workers and manages shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tcp_importer::{HttpFetcher, Job, TcpForwarder, WorkerRegistry};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = WorkerRegistry::new(
//!     Arc::new(HttpFetcher::new()?),
//!     Arc::new(TcpForwarder::new()),
//! );
//! let job = Job::new("node", "http://localhost:9100/metrics", "127.0.0.1:5170")
//!     .with_interval(Duration::from_secs(30));
//! registry.activate(job).await?;
//! registry.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod http;
mod registry;
pub mod tcp;
mod traits;
mod worker;

pub use http::HttpFetcher;
pub use registry::{DEFAULT_SHUTDOWN_TIMEOUT, JobInfo, WorkerRegistry};
pub use tcp::TcpForwarder;
pub use traits::{CollectorError, Delivery, Fetcher, Forwarder};
pub use worker::{CycleOutcome, Worker, WorkerHandle};
