//! tcp-importer - Exposition scraper and TCP shipper
//!
//! Periodically scrapes endpoints that expose metrics in the Prometheus text
//! format, turns every sample line into a structured record and ships each
//! batch as a newline-terminated JSON array to a downstream collector over TCP.
//!
//! # Architecture
//!
//! - **Config**: YAML file with global defaults and a list of jobs
//! - **Job**: A scrape target merged with the defaults exactly once
//! - **Exposition**: Line-oriented parser producing [`MetricRecord`]s
//! - **Collector**: One worker per job (fetch → parse → forward on a timer)
//!
//! # Example
//!
//! ```rust
//! use tcp_importer::{Job, exposition};
//!
//! let job = Job::new("node", "http://localhost:9100/metrics", "127.0.0.1:5170");
//! let records = exposition::parse("# TYPE up gauge\nup{instance=\"a\"} 1\n", &job);
//!
//! assert_eq!(records[0].metric, "up");
//! assert_eq!(records[0].kind, "gauge");
//! assert_eq!(records[0].value, "1");
//! ```

pub mod collector;
pub mod config;
pub mod exposition;
pub mod job;

pub use collector::{
    CollectorError, CycleOutcome, Delivery, Fetcher, Forwarder, HttpFetcher, JobInfo,
    TcpForwarder, Worker, WorkerHandle, WorkerRegistry,
};
pub use config::{AppConfig, ConfigError};
pub use exposition::{Label, MetricRecord};
pub use job::{Job, JobConfig, JobDefaults};
