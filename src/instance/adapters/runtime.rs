//! In-memory container coordinator for hosted instance tests.

use crate::instance::{
    domain::{ContainerStatusReport, Environment, McpInstance, McpProtocol},
    ports::{
        ContainerBuildRequest, ContainerCoordinator, ContainerCoordinatorError,
        ContainerCoordinatorResult, ContainerOperationOutcome, ContainerOptions,
    },
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::debug;

/// Coordinator operation that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinatorOperation {
    /// [`ContainerCoordinator::create`].
    Create,
    /// [`ContainerCoordinator::restart`].
    Restart,
    /// [`ContainerCoordinator::delete`].
    Delete,
    /// [`ContainerCoordinator::status`].
    Status,
    /// [`ContainerCoordinator::logs`].
    Logs,
}

/// In-memory container coordinator.
///
/// This adapter models the container contract without talking to an
/// orchestrator. Containers start pending; tests drive them forward with
/// [`Self::set_status`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryContainerCoordinator {
    state: Arc<RwLock<InMemoryCoordinatorState>>,
}

#[derive(Debug, Default)]
struct InMemoryCoordinatorState {
    containers: HashMap<String, ContainerRecord>,
    failing: HashSet<CoordinatorOperation>,
}

#[derive(Debug, Clone)]
struct ContainerRecord {
    options: ContainerOptions,
    report: ContainerStatusReport,
    logs: Vec<String>,
}

fn runtime_error(message: impl Into<String>) -> ContainerCoordinatorError {
    ContainerCoordinatorError::runtime(std::io::Error::other(message.into()))
}

fn lock_error(err: impl ToString) -> ContainerCoordinatorError {
    runtime_error(err.to_string())
}

fn container_name(instance: &McpInstance) -> ContainerCoordinatorResult<&str> {
    instance
        .container()
        .map(|container| container.container_name())
        .ok_or(ContainerCoordinatorError::NotHosted(instance.id()))
}

impl InMemoryCoordinatorState {
    fn check(&self, operation: CoordinatorOperation) -> ContainerCoordinatorResult<()> {
        if self.failing.contains(&operation) {
            return Err(runtime_error(format!(
                "injected {operation:?} failure"
            )));
        }
        Ok(())
    }

    fn record(&self, name: &str) -> ContainerCoordinatorResult<&ContainerRecord> {
        self.containers
            .get(name)
            .ok_or_else(|| ContainerCoordinatorError::NotFound(name.to_owned()))
    }

    fn record_mut(&mut self, name: &str) -> ContainerCoordinatorResult<&mut ContainerRecord> {
        self.containers
            .get_mut(name)
            .ok_or_else(|| ContainerCoordinatorError::NotFound(name.to_owned()))
    }
}

impl InMemoryContainerCoordinator {
    /// Creates a coordinator with no containers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `operation` fail (`true`) or succeed again (`false`).
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn set_failing(
        &self,
        operation: CoordinatorOperation,
        failing: bool,
    ) -> ContainerCoordinatorResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if failing {
            state.failing.insert(operation);
        } else {
            state.failing.remove(&operation);
        }
        Ok(())
    }

    /// Overrides the reported status of a container.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerCoordinatorError::NotFound`] when the container
    /// does not exist.
    pub fn set_status(
        &self,
        container_name: &str,
        report: ContainerStatusReport,
    ) -> ContainerCoordinatorResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.record_mut(container_name)?.report = report;
        Ok(())
    }

    /// Appends log lines to a container.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerCoordinatorError::NotFound`] when the container
    /// does not exist.
    pub fn append_logs<I, S>(&self, container_name: &str, lines: I) -> ContainerCoordinatorResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .record_mut(container_name)?
            .logs
            .extend(lines.into_iter().map(Into::into));
        Ok(())
    }

    /// Returns the names of all existing containers, sorted.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn container_names(&self) -> ContainerCoordinatorResult<Vec<String>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut names: Vec<String> = state.containers.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Returns the options a container was created with.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn options(&self, container_name: &str) -> ContainerCoordinatorResult<Option<ContainerOptions>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .containers
            .get(container_name)
            .map(|record| record.options.clone()))
    }
}

#[async_trait]
impl ContainerCoordinator for InMemoryContainerCoordinator {
    fn build_options(
        &self,
        request: &ContainerBuildRequest,
    ) -> ContainerCoordinatorResult<ContainerOptions> {
        let spec = &request.spec;
        let command = spec
            .command()
            .map(ToOwned::to_owned)
            .or_else(|| request.stdio_command.clone());
        if request.protocol == McpProtocol::Stdio && command.is_none() {
            return Err(runtime_error("stdio containers need a command to bridge"));
        }

        let instance_suffix = request.instance_id.into_inner().simple().to_string();
        let suffix = match request.generation {
            0 => instance_suffix,
            generation => format!("{instance_suffix}-{generation}"),
        };
        Ok(ContainerOptions {
            container_name: format!("mcp-{suffix}"),
            service_name: format!("mcp-svc-{suffix}"),
            namespace: request.namespace.clone(),
            port: spec.port(),
            deployment: json!({
                "image": spec.image_address(),
                "command": command,
                "initScript": spec.init_script(),
                "packageId": spec.package_id(),
                "port": spec.port(),
                "protocol": request.protocol.as_str(),
                "env": spec.environment_variables(),
                "volumeMounts": spec.volume_mounts(),
                "runningTimeout": spec.timeouts().running_secs(),
            }),
        })
    }

    async fn create(
        &self,
        options: &ContainerOptions,
        environment: &Environment,
        startup_timeout: Option<Duration>,
    ) -> ContainerCoordinatorResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.check(CoordinatorOperation::Create)?;

        if state.containers.contains_key(&options.container_name) {
            return Err(runtime_error(format!(
                "container {} already exists",
                options.container_name
            )));
        }

        debug!(
            container = %options.container_name,
            environment = %environment.name(),
            startup_timeout_secs = startup_timeout.map(|limit| limit.as_secs()),
            "creating container"
        );
        state.containers.insert(
            options.container_name.clone(),
            ContainerRecord {
                options: options.clone(),
                report: ContainerStatusReport::pending(),
                logs: vec![format!(
                    "created {} in namespace {}",
                    options.container_name, options.namespace
                )],
            },
        );
        Ok(())
    }

    async fn restart(
        &self,
        instance: &McpInstance,
    ) -> ContainerCoordinatorResult<ContainerOperationOutcome> {
        let name = container_name(instance)?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.check(CoordinatorOperation::Restart)?;

        let record = state.record_mut(name)?;
        record.report = ContainerStatusReport::pending();
        record.logs.push(format!("restarted {name}"));
        Ok(ContainerOperationOutcome {
            message: format!("restart requested for container {name}"),
        })
    }

    async fn delete(&self, instance: &McpInstance) -> ContainerCoordinatorResult<()> {
        let name = container_name(instance)?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.check(CoordinatorOperation::Delete)?;
        state.containers.remove(name);
        Ok(())
    }

    async fn status(
        &self,
        instance: &McpInstance,
    ) -> ContainerCoordinatorResult<ContainerStatusReport> {
        let name = container_name(instance)?;
        let state = self.state.read().map_err(lock_error)?;
        state.check(CoordinatorOperation::Status)?;
        Ok(state.record(name)?.report.clone())
    }

    async fn logs(
        &self,
        instance: &McpInstance,
        lines: usize,
    ) -> ContainerCoordinatorResult<Vec<String>> {
        let name = container_name(instance)?;
        let state = self.state.read().map_err(lock_error)?;
        state.check(CoordinatorOperation::Logs)?;
        let logs = &state.record(name)?.logs;
        Ok(logs
            .iter()
            .skip(logs.len().saturating_sub(lines))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::domain::{EnvironmentId, EnvironmentType, HostingSettings, HostingSpec, McpInstanceId};

    fn request(protocol: McpProtocol, stdio_command: Option<&str>) -> ContainerBuildRequest {
        ContainerBuildRequest {
            instance_id: McpInstanceId::new(),
            protocol,
            spec: HostingSpec::try_from(HostingSettings {
                environment_id: 1,
                port: 8000,
                image_address: "registry.local/runtime:1".to_owned(),
                ..HostingSettings::default()
            })
            .expect("valid hosting settings"),
            stdio_command: stdio_command.map(ToOwned::to_owned),
            namespace: "tools".to_owned(),
            generation: 0,
        }
    }

    #[test]
    fn build_options_names_are_deterministic() {
        let coordinator = InMemoryContainerCoordinator::new();
        let build = request(McpProtocol::Sse, None);

        let first = coordinator.build_options(&build).expect("options should build");
        let second = coordinator.build_options(&build).expect("options should build");

        assert_eq!(first, second);
        assert!(first.service_name.starts_with("mcp-svc-"));
        assert_eq!(first.namespace, "tools");
    }

    #[test]
    fn later_generations_get_distinct_names() {
        let coordinator = InMemoryContainerCoordinator::new();
        let first = request(McpProtocol::Sse, None);
        let replacement = ContainerBuildRequest {
            generation: 2,
            ..first.clone()
        };

        let original = coordinator.build_options(&first).expect("options should build");
        let redeployed = coordinator
            .build_options(&replacement)
            .expect("options should build");

        assert_eq!(redeployed.container_name, format!("{}-2", original.container_name));
        assert_eq!(redeployed.service_name, format!("{}-2", original.service_name));
    }

    #[test]
    fn stdio_options_carry_bridged_command() {
        let coordinator = InMemoryContainerCoordinator::new();
        let options = coordinator
            .build_options(&request(McpProtocol::Stdio, Some("npx server")))
            .expect("options should build");
        assert_eq!(options.deployment["command"], json!("npx server"));
    }

    #[test]
    fn stdio_without_command_is_rejected() {
        let coordinator = InMemoryContainerCoordinator::new();
        let result = coordinator.build_options(&request(McpProtocol::Stdio, None));
        assert!(matches!(result, Err(ContainerCoordinatorError::Runtime(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn injected_create_failure_leaves_no_container() {
        let coordinator = InMemoryContainerCoordinator::new();
        coordinator
            .set_failing(CoordinatorOperation::Create, true)
            .expect("failure injection should succeed");
        let options = coordinator
            .build_options(&request(McpProtocol::Sse, None))
            .expect("options should build");
        let environment = Environment::new(
            EnvironmentId::new(1).expect("valid environment id"),
            "cluster",
            EnvironmentType::Kubernetes,
            "tools",
        );

        let result = coordinator.create(&options, &environment, None).await;

        assert!(result.is_err());
        assert!(coordinator
            .container_names()
            .expect("names should be listed")
            .is_empty());
    }
}
