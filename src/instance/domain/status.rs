//! Instance and container status domain types.

use super::ParseInstanceValueError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enabled state of the logical instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Instance is enabled.
    Active,
    /// Instance is disabled but retained.
    Inactive,
}

impl InstanceStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for InstanceStatus {
    type Error = ParseInstanceValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(ParseInstanceValueError::new("instance status", value)),
        }
    }
}

/// Lifecycle state of the compute resource behind a hosted instance.
///
/// Independent of [`InstanceStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    /// Requested but not yet running.
    Pending,
    /// Running and ready.
    Running,
    /// Running but not passing readiness checks.
    RunningUnready,
    /// Stopped.
    Stopped,
    /// Failed to start or crashed.
    Failed,
}

impl ContainerStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::RunningUnready => "running_unready",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ContainerStatus {
    type Error = ParseInstanceValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "running_unready" => Ok(Self::RunningUnready),
            "stopped" => Ok(Self::Stopped),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseInstanceValueError::new("container status", value)),
        }
    }
}

/// Container state as reported by the container coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatusReport {
    status: ContainerStatus,
    is_ready: bool,
    message: Option<String>,
}

impl ContainerStatusReport {
    /// Creates a status report.
    #[must_use]
    pub const fn new(status: ContainerStatus, is_ready: bool) -> Self {
        Self {
            status,
            is_ready,
            message: None,
        }
    }

    /// Creates the report of a freshly requested container.
    #[must_use]
    pub const fn pending() -> Self {
        Self::new(ContainerStatus::Pending, false)
    }

    /// Adds an explanatory message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let normalized = message.into().trim().to_owned();
        if !normalized.is_empty() {
            self.message = Some(normalized);
        }
        self
    }

    /// Returns the container status.
    #[must_use]
    pub const fn status(&self) -> ContainerStatus {
        self.status
    }

    /// Returns whether the container passed its startup probe.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Returns the optional detail message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
