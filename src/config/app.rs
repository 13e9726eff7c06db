//! Application configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobConfig, JobDefaults};

use super::validation::ConfigError;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tcp_importer.yml";

/// Top-level application configuration.
///
/// ```yaml
/// interval: 30
/// tcp: 127.0.0.1:5170
/// type: prometheus
/// jobs:
///   - name: node
///     url: http://localhost:9100/metrics
///   - name: redis
///     url: http://localhost:9121/metrics
///     interval: 60
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default polling interval in seconds.
    #[serde(default)]
    pub interval: u64,

    /// Default target collector address (`host:port`).
    #[serde(default)]
    pub tcp: String,

    /// Default source type tag.
    #[serde(default, rename = "type")]
    pub kind: String,

    /// Default fetch timeout (e.g., "10s"); unbounded when unset.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Scrape jobs.
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Global defaults inherited by every job.
    pub fn defaults(&self) -> JobDefaults {
        JobDefaults {
            interval: self.interval,
            tcp: self.tcp.clone(),
            kind: self.kind.clone(),
            timeout: self.timeout,
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if there are no jobs or any job
    /// is invalid once defaults are applied. Names may repeat; every entry
    /// gets its own worker.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one job must be configured".to_string(),
            ));
        }

        self.jobs().map(|_| ())
    }

    /// Merge every job with the global defaults.
    pub fn jobs(&self) -> Result<Vec<Job>, ConfigError> {
        let defaults = self.defaults();
        self.jobs.iter().map(|j| j.merge(&defaults)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
interval: 30
tcp: 127.0.0.1:5170
type: prometheus
jobs:
  - name: node
    url: http://localhost:9100/metrics
  - name: redis
    url: http://localhost:9121/metrics
    interval: 60
    type: redis_exporter
    tcp: 10.0.0.5:6000
"#;

    #[test]
    fn test_from_yaml_merges_defaults() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();
        let jobs = config.jobs().unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "node");
        assert_eq!(jobs[0].interval, Duration::from_secs(30));
        assert_eq!(jobs[0].target, "127.0.0.1:5170");
        assert_eq!(jobs[0].kind, "prometheus");

        assert_eq!(jobs[1].interval, Duration::from_secs(60));
        assert_eq!(jobs[1].target, "10.0.0.5:6000");
        assert_eq!(jobs[1].kind, "redis_exporter");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.jobs.len(), 2);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(dir.path().join("missing.yml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = AppConfig::from_yaml("jobs: [name: {");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_no_jobs() {
        let result = AppConfig::from_yaml("interval: 10\ntcp: 127.0.0.1:5170\n");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("at least one job")
        );
    }

    #[test]
    fn test_repeated_job_names_are_kept() {
        let yaml = r#"
interval: 10
tcp: 127.0.0.1:5170
jobs:
  - name: node
    url: http://a:9100/metrics
  - name: node
    url: http://b:9100/metrics
"#;
        let jobs = AppConfig::from_yaml(yaml).unwrap().jobs().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "node");
        assert_eq!(jobs[1].name, "node");
        assert_eq!(jobs[0].url, "http://a:9100/metrics");
        assert_eq!(jobs[1].url, "http://b:9100/metrics");
    }

    #[test]
    fn test_zero_interval_after_merge() {
        let yaml = r#"
tcp: 127.0.0.1:5170
jobs:
  - name: node
    url: http://localhost:9100/metrics
"#;
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("interval must be non-zero"));
    }

    #[test]
    fn test_global_timeout_inherited() {
        let yaml = r#"
interval: 10
tcp: 127.0.0.1:5170
timeout: 2s
jobs:
  - name: node
    url: http://localhost:9100/metrics
  - name: slow
    url: http://localhost:9200/metrics
    timeout: 30s
"#;
        let jobs = AppConfig::from_yaml(yaml).unwrap().jobs().unwrap();
        assert_eq!(jobs[0].timeout, Some(Duration::from_secs(2)));
        assert_eq!(jobs[1].timeout, Some(Duration::from_secs(30)));
    }
}
