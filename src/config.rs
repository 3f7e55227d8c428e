//! Orchestrator configuration.
//!
//! Configuration is plain data: it is loaded once, validated, and handed to
//! the orchestrator and its adapters at composition time.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Longest accepted probe timeout, in seconds.
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 300;

/// Settings shared by instance orchestration components.
///
/// # Examples
///
/// ```
/// use mcp_conductor::config::OrchestratorConfig;
/// use std::time::Duration;
///
/// let config = OrchestratorConfig::default();
/// assert_eq!(config.probe_timeout(), Duration::from_secs(5));
///
/// let loaded = OrchestratorConfig::from_json_str(r#"{"probe_timeout_secs": 2}"#)
///     .expect("valid configuration");
/// assert_eq!(loaded.probe_timeout(), Duration::from_secs(2));
/// assert!(loaded.http_probe);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Upper bound on a passthrough reachability probe, in seconds.
    pub probe_timeout_secs: u64,
    /// Whether probes follow the TCP connect with an HTTP request.
    pub http_probe: bool,
    /// Externally reachable origin of the platform proxy.
    pub public_base_url: String,
    /// DNS suffix of in-cluster services.
    pub cluster_domain: String,
    /// Image prefixes identifying the built-in hosting runtime.
    pub hosting_runtime_images: Vec<String>,
    /// Default number of log lines returned for a container.
    pub log_tail_lines: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: 5,
            http_probe: true,
            public_base_url: "http://localhost:8080".to_owned(),
            cluster_domain: "svc.cluster.local".to_owned(),
            hosting_runtime_images: vec!["mcp-hosting-runtime".to_owned()],
            log_tail_lines: 100,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a configuration whose probes only check TCP connectivity.
    ///
    /// Useful where upstream servers close plain HTTP requests abruptly.
    #[must_use]
    pub fn tcp_only() -> Self {
        Self {
            http_probe: false,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is malformed or a value is
    /// out of range.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_timeout_secs == 0 {
            return Err(ConfigError::invalid("probe_timeout_secs", "must be positive"));
        }
        if self.probe_timeout_secs > MAX_PROBE_TIMEOUT_SECS {
            return Err(ConfigError::invalid(
                "probe_timeout_secs",
                "must not exceed 300 seconds",
            ));
        }
        if Url::parse(&self.public_base_url).is_err() {
            return Err(ConfigError::invalid("public_base_url", "must be an absolute URL"));
        }
        if self.cluster_domain.trim_matches('.').is_empty() {
            return Err(ConfigError::invalid("cluster_domain", "must not be empty"));
        }
        if self.log_tail_lines == 0 {
            return Err(ConfigError::invalid("log_tail_lines", "must be positive"));
        }
        Ok(())
    }

    /// Returns the probe timeout.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Errors returned while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON or has unknown keys.
    #[error("invalid configuration document: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// Violated requirement.
        reason: &'static str,
    },
}

impl ConfigError {
    const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}
