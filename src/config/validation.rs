//! Configuration validation utilities.

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Validate that `url` is an absolute HTTP(S) URL.
pub fn validate_url(job: &str, url: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(url).map_err(|e| {
        ConfigError::ValidationError(format!("job '{}': invalid url '{}': {}", job, url, e))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::ValidationError(format!(
            "job '{}': unsupported url scheme '{}'",
            job, other
        ))),
    }
}

/// Validate a `host:port` target address.
///
/// The host is not resolved here; resolution happens on every forward.
pub fn validate_target(job: &str, target: &str) -> Result<(), ConfigError> {
    let Some((host, port)) = target.rsplit_once(':') else {
        return Err(ConfigError::ValidationError(format!(
            "job '{}': target '{}' must be host:port",
            job, target
        )));
    };

    if host.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "job '{}': target '{}' has an empty host",
            job, target
        )));
    }

    match port.parse::<u16>() {
        Ok(p) if p != 0 => Ok(()),
        _ => Err(ConfigError::ValidationError(format!(
            "job '{}': target '{}' has an invalid port",
            job, target
        ))),
    }
}

/// Expand environment variables in a string.
/// Supports ${VAR} and ${VAR:-default} syntax.
pub fn expand_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

    let regex = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("failed to compile env var regex")
    });

    regex
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}
