//! Service layer for MCP instance orchestration.

use super::{
    error::{EnrichmentError, InstanceServiceError, InstanceServiceResult},
    requests::{CreateInstanceRequest, EditInstanceRequest},
    status::{HealthProbe, InstanceHealthReport, StatusProbe},
    strategy::{StrategyContext, strategy_for},
};
use crate::config::{ConfigError, OrchestratorConfig};
use crate::instance::{
    domain::{
        EnvironmentId, InstanceDraft, InstanceName, McpInstance, McpInstanceId,
        ProxyConfigSynthesizer,
    },
    ports::{
        ContainerCoordinator, EndpointProbe, EnvironmentDirectory, InstanceRepositoryError,
        McpInstanceRepository,
    },
};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Instance together with best-effort display enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDescription {
    /// The stored instance.
    #[serde(flatten)]
    pub instance: McpInstance,
    /// Name of the hosting environment, when it could be resolved.
    pub environment_name: Option<String>,
}

/// MCP instance orchestration service.
///
/// Selects the access strategy of each instance, applies its derived state
/// and persists the result. Collaborators are injected at construction.
#[derive(Clone)]
pub struct InstanceOrchestrator<R, E, C, P, K>
where
    R: McpInstanceRepository,
    E: EnvironmentDirectory,
    C: ContainerCoordinator,
    P: EndpointProbe,
    K: Clock + Send + Sync,
{
    repository: Arc<R>,
    environments: Arc<E>,
    coordinator: Arc<C>,
    status_probe: StatusProbe<C, P>,
    clock: Arc<K>,
    config: OrchestratorConfig,
    synthesizer: ProxyConfigSynthesizer,
}

impl<R, E, C, P, K> InstanceOrchestrator<R, E, C, P, K>
where
    R: McpInstanceRepository,
    E: EnvironmentDirectory,
    C: ContainerCoordinator,
    P: EndpointProbe,
    K: Clock + Send + Sync,
{
    /// Creates an orchestrator with the default configuration.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        environments: Arc<E>,
        coordinator: Arc<C>,
        endpoint_probe: Arc<P>,
        clock: Arc<K>,
    ) -> Self {
        let config = OrchestratorConfig::default();
        Self {
            repository,
            environments,
            status_probe: StatusProbe::new(
                Arc::clone(&coordinator),
                endpoint_probe,
                config.probe_timeout(),
            ),
            coordinator,
            clock,
            synthesizer: synthesizer_for(&config),
            config,
        }
    }

    /// Replaces the configuration after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.status_probe = self.status_probe.with_probe_timeout(config.probe_timeout());
        self.synthesizer = synthesizer_for(&config);
        self.config = config;
        Ok(self)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Returns the status probe used by [`Self::status`].
    #[must_use]
    pub const fn status_probe(&self) -> &StatusProbe<C, P> {
        &self.status_probe
    }

    fn context(&self) -> StrategyContext<'_> {
        StrategyContext {
            environments: &*self.environments,
            coordinator: &*self.coordinator,
            synthesizer: &self.synthesizer,
            config: &self.config,
        }
    }

    async fn find_instance_or_error(
        &self,
        instance_id: McpInstanceId,
    ) -> InstanceServiceResult<McpInstance> {
        self.repository
            .find_by_id(instance_id)
            .await?
            .ok_or(InstanceServiceError::NotFound(instance_id))
    }

    async fn ensure_name_available(
        &self,
        name: &InstanceName,
        owner: Option<McpInstanceId>,
    ) -> InstanceServiceResult<()> {
        match self.repository.find_by_name(name).await? {
            Some(existing) if Some(existing.id()) != owner => Err(
                InstanceRepositoryError::DuplicateInstanceName(name.clone()).into(),
            ),
            _ => Ok(()),
        }
    }

    /// Creates an instance.
    ///
    /// Hosted instances have their container created before the record is
    /// stored; when container creation fails nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError`] when validation fails, the name is
    /// taken, or a collaborator fails.
    pub async fn create(&self, request: CreateInstanceRequest) -> InstanceServiceResult<McpInstance> {
        let CreateInstanceRequest {
            access_type,
            definition,
        } = request;
        let name = InstanceName::new(definition.name.as_str())?;
        self.ensure_name_available(&name, None).await?;

        let instance_id = McpInstanceId::new();
        let revision = strategy_for(access_type)
            .plan(&self.context(), instance_id, &definition)
            .await?;
        let instance = McpInstance::new(
            InstanceDraft {
                id: instance_id,
                name: revision.name,
                access_type,
                mcp_protocol: revision.mcp_protocol,
                source_config: revision.source_config,
                configs: revision.configs,
                container: revision.container,
            },
            &*self.clock,
        );

        if let Err(err) = self.repository.create(&instance).await {
            error!(
                instance_id = %instance_id,
                access_type = %access_type,
                error = %err,
                "failed to persist MCP instance"
            );
            return Err(err.into());
        }

        info!(
            instance_id = %instance_id,
            access_type = %access_type,
            protocol = %instance.mcp_protocol(),
            "MCP instance created"
        );
        Ok(instance)
    }

    /// Edits an instance through the strategy of its stored access type.
    ///
    /// Hosted instances are redeployed and return to pending.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError::AccessTypeImmutable`] when the request
    /// names a different access type, plus the errors of [`Self::create`].
    pub async fn edit(&self, request: EditInstanceRequest) -> InstanceServiceResult<McpInstance> {
        let EditInstanceRequest {
            instance_id,
            access_type,
            definition,
        } = request;
        let mut instance = self.find_instance_or_error(instance_id).await?;
        let stored = instance.access_type();
        if let Some(requested) = access_type
            && requested != stored
        {
            return Err(InstanceServiceError::AccessTypeImmutable { stored, requested });
        }

        let name = InstanceName::new(definition.name.as_str())?;
        self.ensure_name_available(&name, Some(instance_id)).await?;

        let revision = strategy_for(stored)
            .revise(&self.context(), &instance, &definition)
            .await?;
        instance.apply_revision(revision, &*self.clock);
        self.repository.update(&instance).await?;

        info!(instance_id = %instance_id, access_type = %stored, "MCP instance edited");
        Ok(instance)
    }

    /// Restarts the container of a hosted instance.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError::RestartNotSupported`] for passthrough
    /// instances, or coordinator and persistence errors.
    pub async fn restart(&self, instance_id: McpInstanceId) -> InstanceServiceResult<McpInstance> {
        let mut instance = self.find_instance_or_error(instance_id).await?;
        let outcome = strategy_for(instance.access_type())
            .restart(&self.context(), &instance)
            .await?;
        instance.mark_restarting(outcome.message, &*self.clock)?;
        self.repository.update(&instance).await?;

        info!(instance_id = %instance_id, "MCP instance restarted");
        Ok(instance)
    }

    /// Marks an instance inactive. Disabling an inactive instance is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError::NotFound`] or persistence errors.
    pub async fn disable(&self, instance_id: McpInstanceId) -> InstanceServiceResult<McpInstance> {
        let mut instance = self.find_instance_or_error(instance_id).await?;
        if instance.disable(&*self.clock) {
            self.repository.update(&instance).await?;
            info!(instance_id = %instance_id, "MCP instance disabled");
        }
        Ok(instance)
    }

    /// Marks an instance active. Enabling an active instance is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError::NotFound`] or persistence errors.
    pub async fn enable(&self, instance_id: McpInstanceId) -> InstanceServiceResult<McpInstance> {
        let mut instance = self.find_instance_or_error(instance_id).await?;
        if instance.enable(&*self.clock) {
            self.repository.update(&instance).await?;
            info!(instance_id = %instance_id, "MCP instance enabled");
        }
        Ok(instance)
    }

    /// Deletes an instance, tearing down its container first.
    ///
    /// # Errors
    ///
    /// Returns coordinator errors when teardown fails, in which case the
    /// record is kept, or persistence errors.
    pub async fn delete(&self, instance_id: McpInstanceId) -> InstanceServiceResult<()> {
        let instance = self.find_instance_or_error(instance_id).await?;
        if let Err(err) = strategy_for(instance.access_type())
            .teardown(&self.context(), &instance)
            .await
        {
            warn!(
                instance_id = %instance_id,
                error = %err,
                "container teardown failed; keeping MCP instance"
            );
            return Err(err);
        }
        self.repository.delete(instance_id).await?;

        info!(instance_id = %instance_id, access_type = %instance.access_type(), "MCP instance deleted");
        Ok(())
    }

    /// Determines live health of an instance.
    ///
    /// Container state reported for hosted instances is written back to the
    /// stored record when it changed.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError::NotFound`] or coordinator errors.
    pub async fn status(
        &self,
        instance_id: McpInstanceId,
    ) -> InstanceServiceResult<InstanceHealthReport> {
        let mut instance = self.find_instance_or_error(instance_id).await?;
        let report = self.status_probe.check(&instance).await?;

        if let HealthProbe::Container(container_report) = &report.probe
            && instance.record_container_status(container_report, &*self.clock)
            && let Err(err) = self.repository.update(&instance).await
        {
            warn!(
                instance_id = %instance_id,
                error = %err,
                "failed to store refreshed container status"
            );
        }
        Ok(report)
    }

    /// Returns an instance.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError::NotFound`] or persistence errors.
    pub async fn get(&self, instance_id: McpInstanceId) -> InstanceServiceResult<McpInstance> {
        self.find_instance_or_error(instance_id).await
    }

    /// Finds an instance by name.
    ///
    /// # Errors
    ///
    /// Returns domain validation errors when the name is invalid and
    /// persistence errors from the repository.
    pub async fn find_by_name(&self, name: &str) -> InstanceServiceResult<Option<McpInstance>> {
        let validated_name = InstanceName::new(name)?;
        Ok(self.repository.find_by_name(&validated_name).await?)
    }

    /// Lists all instances.
    ///
    /// # Errors
    ///
    /// Returns persistence-layer errors from the repository.
    pub async fn list_all(&self) -> InstanceServiceResult<Vec<McpInstance>> {
        Ok(self.repository.list_all().await?)
    }

    /// Returns an instance with its environment name resolved.
    ///
    /// A failed environment lookup leaves the name empty.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError::NotFound`] or persistence errors.
    pub async fn describe(
        &self,
        instance_id: McpInstanceId,
    ) -> InstanceServiceResult<InstanceDescription> {
        let instance = self.find_instance_or_error(instance_id).await?;
        let environment_name = self.resolve_environment_name(&instance).await;
        Ok(InstanceDescription {
            instance,
            environment_name,
        })
    }

    async fn resolve_environment_name(&self, instance: &McpInstance) -> Option<String> {
        let environment_id = instance.hosting_spec()?.environment_id();
        self.environment_name(environment_id)
            .await
            .inspect_err(|err| {
                warn!(
                    instance_id = %instance.id(),
                    environment_id = %environment_id,
                    error = %err,
                    "environment enrichment failed"
                );
            })
            .ok()
    }

    async fn environment_name(&self, environment_id: EnvironmentId) -> Result<String, EnrichmentError> {
        self.environments
            .get(environment_id)
            .await?
            .map(|environment| environment.name().to_owned())
            .ok_or(EnrichmentError::EnvironmentMissing(environment_id))
    }

    /// Returns trailing container log lines of a hosted instance.
    ///
    /// Passthrough instances have no logs, and coordinator failures degrade
    /// to an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceServiceError::NotFound`] or persistence errors.
    pub async fn container_logs(
        &self,
        instance_id: McpInstanceId,
        lines: Option<usize>,
    ) -> InstanceServiceResult<Vec<String>> {
        let instance = self.find_instance_or_error(instance_id).await?;
        if instance.container().is_none() {
            return Ok(Vec::new());
        }

        let tail = lines.unwrap_or(self.config.log_tail_lines);
        match self.coordinator.logs(&instance, tail).await {
            Ok(logs) => Ok(logs),
            Err(err) => {
                warn!(instance_id = %instance_id, error = %err, "container logs unavailable");
                Ok(Vec::new())
            }
        }
    }
}

fn synthesizer_for(config: &OrchestratorConfig) -> ProxyConfigSynthesizer {
    ProxyConfigSynthesizer::new(config.public_base_url.as_str(), config.cluster_domain.as_str())
}
