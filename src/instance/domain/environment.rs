//! Deployment environment consumed by hosted instances.

use super::{EnvironmentId, ParseInstanceValueError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of deployment surface an environment describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentType {
    /// A Kubernetes cluster namespace.
    Kubernetes,
    /// A Docker daemon.
    Docker,
}

impl EnvironmentType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::Docker => "docker",
        }
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EnvironmentType {
    type Error = ParseInstanceValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "kubernetes" => Ok(Self::Kubernetes),
            "docker" => Ok(Self::Docker),
            _ => Err(ParseInstanceValueError::new("environment type", value)),
        }
    }
}

/// Deployment environment, owned by the environment subsystem and read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    id: EnvironmentId,
    name: String,
    environment_type: EnvironmentType,
    namespace: String,
    config: Value,
}

impl Environment {
    /// Creates an environment description.
    #[must_use]
    pub fn new(
        id: EnvironmentId,
        name: impl Into<String>,
        environment_type: EnvironmentType,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            environment_type,
            namespace: namespace.into(),
            config: Value::Null,
        }
    }

    /// Attaches connection configuration.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Returns the environment identifier.
    #[must_use]
    pub const fn id(&self) -> EnvironmentId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the deployment surface kind.
    #[must_use]
    pub const fn environment_type(&self) -> EnvironmentType {
        self.environment_type
    }

    /// Returns the namespace containers are deployed into.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the connection configuration.
    #[must_use]
    pub const fn config(&self) -> &Value {
        &self.config
    }
}
