//! Container coordinator port for hosted MCP instances.

use crate::instance::domain::{
    ContainerStatusReport, Environment, HostingSpec, McpInstance, McpInstanceId, McpProtocol,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for container coordinator operations.
pub type ContainerCoordinatorResult<T> = Result<T, ContainerCoordinatorError>;

/// Inputs needed to derive container options for a hosted instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerBuildRequest {
    /// Instance the container belongs to.
    pub instance_id: McpInstanceId,
    /// Declared protocol of the hosted server.
    pub protocol: McpProtocol,
    /// Validated hosting settings.
    pub spec: HostingSpec,
    /// Command line of a stdio server bridged by the hosting runtime.
    pub stdio_command: Option<String>,
    /// Namespace of the target environment.
    pub namespace: String,
    /// Deployment generation; zero for the first container of an instance.
    pub generation: u32,
}

/// Deployment options produced by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Container (deployment) name.
    pub container_name: String,
    /// In-cluster service name fronting the container.
    pub service_name: String,
    /// Namespace the container is deployed into.
    pub namespace: String,
    /// Service port.
    pub port: u16,
    /// Orchestrator-specific deployment description.
    pub deployment: Value,
}

/// Result of a restart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOperationOutcome {
    /// Operator-facing message.
    pub message: String,
}

/// Lifecycle control of the containers backing hosted instances.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerCoordinator: Send + Sync {
    /// Derives deployment options for a hosted instance.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerCoordinatorError`] when the settings cannot be
    /// expressed as a deployment.
    fn build_options(
        &self,
        request: &ContainerBuildRequest,
    ) -> ContainerCoordinatorResult<ContainerOptions>;

    /// Creates the container described by `options` in `environment`.
    async fn create(
        &self,
        options: &ContainerOptions,
        environment: &Environment,
        startup_timeout: Option<Duration>,
    ) -> ContainerCoordinatorResult<()>;

    /// Restarts the container of a hosted instance.
    async fn restart(
        &self,
        instance: &McpInstance,
    ) -> ContainerCoordinatorResult<ContainerOperationOutcome>;

    /// Deletes the container of a hosted instance.
    async fn delete(&self, instance: &McpInstance) -> ContainerCoordinatorResult<()>;

    /// Reports the live container status of a hosted instance.
    async fn status(&self, instance: &McpInstance) -> ContainerCoordinatorResult<ContainerStatusReport>;

    /// Returns up to `lines` trailing log lines of the container.
    async fn logs(
        &self,
        instance: &McpInstance,
        lines: usize,
    ) -> ContainerCoordinatorResult<Vec<String>>;
}

/// Errors returned by container coordinator adapters.
#[derive(Debug, Clone, Error)]
pub enum ContainerCoordinatorError {
    /// The instance carries no container state.
    #[error("MCP instance {0} has no container")]
    NotHosted(McpInstanceId),

    /// The orchestrator does not know the container.
    #[error("container not found: {0}")]
    NotFound(String),

    /// Generic orchestrator failure.
    #[error("container runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ContainerCoordinatorError {
    /// Wraps a runtime error from the orchestrator.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
