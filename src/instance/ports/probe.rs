//! Network reachability probe port.

use async_trait::async_trait;
use std::time::Duration;

/// Result of probing an upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Whether the endpoint answered within the time limit.
    pub reachable: bool,
    /// Short description of the failure or the HTTP status seen.
    pub detail: Option<String>,
}

impl ProbeOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub const fn reachable() -> Self {
        Self {
            reachable: true,
            detail: None,
        }
    }

    /// Creates a failed outcome with a reason.
    #[must_use]
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            reachable: false,
            detail: Some(detail.into()),
        }
    }

    /// Attaches a detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Checks whether an MCP endpoint URL is reachable.
///
/// Probing never fails: every problem is reported as an unreachable outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    /// Probes `url`, giving up after `timeout`.
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome;
}
