//! Scrape job model and default inheritance.
//!
//! A [`JobConfig`] is a raw entry from the configuration file where any field
//! may be left unset. [`JobConfig::merge`] fills the gaps from [`JobDefaults`]
//! exactly once and validates the result, producing the immutable [`Job`]
//! that the worker registry accepts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, expand_env_vars, validate_target, validate_url};

/// Global fallback values applied to every job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDefaults {
    /// Polling interval in seconds.
    pub interval: u64,
    /// Target collector address (`host:port`).
    pub tcp: String,
    /// Source type tag written to every record.
    pub kind: String,
    /// Fetch timeout, unbounded when `None`.
    pub timeout: Option<Duration>,
}

/// Per-job entry as written in the configuration file.
///
/// Empty strings and a zero interval mean "inherit from defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name, copied into every record.
    #[serde(default)]
    pub name: String,
    /// Polling interval in seconds.
    #[serde(default)]
    pub interval: u64,
    /// Source type tag.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Target collector address (`host:port`).
    #[serde(default)]
    pub tcp: String,
    /// Exposition endpoint to scrape.
    #[serde(default)]
    pub url: String,
    /// Fetch timeout (e.g., "10s").
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl JobConfig {
    /// Create a job entry with only a name and url; everything else inherits.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Apply defaults to unset fields and validate the merged job.
    ///
    /// Environment variables in `url` and `tcp` are expanded after inheritance.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if the merged job is unusable
    /// (zero interval, missing target, bad url, empty name).
    pub fn merge(&self, defaults: &JobDefaults) -> Result<Job, ConfigError> {
        let interval = if self.interval == 0 {
            defaults.interval
        } else {
            self.interval
        };
        let target = if self.tcp.is_empty() {
            &defaults.tcp
        } else {
            &self.tcp
        };
        let kind = if self.kind.is_empty() {
            &defaults.kind
        } else {
            &self.kind
        };

        let job = Job {
            name: self.name.clone(),
            interval: Duration::from_secs(interval),
            kind: kind.clone(),
            target: expand_env_vars(target),
            url: expand_env_vars(&self.url),
            timeout: self.timeout.or(defaults.timeout),
        };
        job.validate()?;
        Ok(job)
    }
}

/// A fully-defaulted scrape job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Job name.
    pub name: String,
    /// Time between two scrape cycles.
    pub interval: Duration,
    /// Source type tag.
    pub kind: String,
    /// Target collector address (`host:port`).
    pub target: String,
    /// Exposition endpoint to scrape.
    pub url: String,
    /// Fetch timeout, unbounded when `None`.
    pub timeout: Option<Duration>,
}

impl Job {
    /// Create a job with a 1 second interval and no type tag.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            interval: Duration::from_secs(1),
            kind: String::new(),
            target: target.into(),
            url: url.into(),
            timeout: None,
        }
    }

    /// Set the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the source type tag.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the fetch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check that the job can be scheduled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "job name cannot be empty".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ValidationError(format!(
                "job '{}': interval must be non-zero",
                self.name
            )));
        }
        validate_target(&self.name, &self.target)?;
        validate_url(&self.name, &self.url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> JobDefaults {
        JobDefaults {
            interval: 15,
            tcp: "127.0.0.1:5170".to_string(),
            kind: "prometheus".to_string(),
            timeout: None,
        }
    }

    #[test]
    fn test_merge_inherits_unset_fields() {
        let job = JobConfig::new("node", "http://localhost:9100/metrics")
            .merge(&defaults())
            .unwrap();

        assert_eq!(job.name, "node");
        assert_eq!(job.interval, Duration::from_secs(15));
        assert_eq!(job.target, "127.0.0.1:5170");
        assert_eq!(job.kind, "prometheus");
        assert_eq!(job.url, "http://localhost:9100/metrics");
        assert_eq!(job.timeout, None);
    }

    #[test]
    fn test_merge_keeps_overrides() {
        let config = JobConfig {
            name: "redis".to_string(),
            interval: 60,
            kind: "redis_exporter".to_string(),
            tcp: "10.0.0.5:6000".to_string(),
            url: "http://localhost:9121/metrics".to_string(),
            timeout: Some(Duration::from_secs(3)),
        };
        let job = config.merge(&defaults()).unwrap();

        assert_eq!(job.interval, Duration::from_secs(60));
        assert_eq!(job.target, "10.0.0.5:6000");
        assert_eq!(job.kind, "redis_exporter");
        assert_eq!(job.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_merge_zero_interval_is_error() {
        let mut d = defaults();
        d.interval = 0;
        let err = JobConfig::new("node", "http://localhost:9100/metrics")
            .merge(&d)
            .unwrap_err();
        assert!(err.to_string().contains("interval must be non-zero"));
    }

    #[test]
    fn test_merge_missing_target_is_error() {
        let mut d = defaults();
        d.tcp = String::new();
        let result = JobConfig::new("node", "http://localhost:9100/metrics").merge(&d);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_empty_name_is_error() {
        let result = JobConfig::new("", "http://localhost:9100/metrics").merge(&defaults());
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_empty_type_stays_empty() {
        let mut d = defaults();
        d.kind = String::new();
        let job = JobConfig::new("node", "http://localhost:9100/metrics")
            .merge(&d)
            .unwrap();
        assert_eq!(job.kind, "");
    }

    #[test]
    fn test_job_builder() {
        let job = Job::new("node", "http://localhost:9100/metrics", "127.0.0.1:5170")
            .with_interval(Duration::from_secs(5))
            .with_kind("node_exporter")
            .with_timeout(Duration::from_secs(2));

        assert_eq!(job.interval, Duration::from_secs(5));
        assert_eq!(job.kind, "node_exporter");
        assert_eq!(job.timeout, Some(Duration::from_secs(2)));
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_job_config_yaml_type_key() {
        let yaml = r#"
name: node
type: node_exporter
url: http://localhost:9100/metrics
timeout: 5s
"#;
        let config: JobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.kind, "node_exporter");
        assert_eq!(config.interval, 0);
        assert_eq!(config.tcp, "");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
