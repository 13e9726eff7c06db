//! Configuration module for tcp-importer.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Global job defaults (interval, target address, source type, fetch timeout)
//! - Job definitions (name, url, optional per-job overrides)

mod app;
mod validation;

pub use app::AppConfig;
pub use validation::{ConfigError, expand_env_vars, validate_target, validate_url};

// Re-export constants
pub use app::DEFAULT_CONFIG_FILE;
