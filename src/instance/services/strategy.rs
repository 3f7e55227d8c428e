//! Per-access-type orchestration strategies.
//!
//! Every operation on an instance is routed through the strategy selected
//! from its access type: the requested one on create, the stored one
//! afterwards. Strategies derive state but never persist it.

use super::{
    error::{InstanceServiceError, InstanceServiceResult},
    requests::InstanceDefinition,
    status::HealthProbe,
};
use crate::config::OrchestratorConfig;
use crate::instance::{
    domain::{
        AccessType, Environment, EnvironmentType, HostedContainer, HostingSpec, HostingTarget,
        InstanceName, InstanceRevision, McpInstance, McpInstanceId, McpProtocol,
        ProxyConfigSynthesizer, ProxySynthesisError, ValidatedServerConfig, validate_server_config,
        validate_server_document,
    },
    ports::{
        ContainerBuildRequest, ContainerCoordinator, ContainerOperationOutcome, ContainerOptions,
        EndpointProbe, EnvironmentDirectory,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Collaborators available to strategies while planning and tearing down.
#[derive(Clone, Copy)]
pub struct StrategyContext<'a> {
    /// Environment lookup.
    pub environments: &'a dyn EnvironmentDirectory,
    /// Container lifecycle control.
    pub coordinator: &'a dyn ContainerCoordinator,
    /// Configuration synthesizer.
    pub synthesizer: &'a ProxyConfigSynthesizer,
    /// Orchestrator settings.
    pub config: &'a OrchestratorConfig,
}

/// Collaborators available to strategies while checking health.
#[derive(Clone, Copy)]
pub struct ProbeContext<'a> {
    /// Container lifecycle control.
    pub coordinator: &'a dyn ContainerCoordinator,
    /// Network reachability probe.
    pub endpoint_probe: &'a dyn EndpointProbe,
    /// Upper bound on a network probe.
    pub probe_timeout: Duration,
}

/// Orchestration behaviour of one access type.
#[async_trait]
pub trait AccessStrategy: Send + Sync {
    /// Returns the access type this strategy serves.
    fn access_type(&self) -> AccessType;

    /// Validates a definition and derives the state of a new instance.
    ///
    /// Hosted instances have their container created here, after every
    /// validation step has passed.
    async fn plan(
        &self,
        context: &StrategyContext<'_>,
        instance_id: McpInstanceId,
        definition: &InstanceDefinition,
    ) -> InstanceServiceResult<InstanceRevision>;

    /// Validates a definition and derives replacement state for `current`.
    async fn revise(
        &self,
        context: &StrategyContext<'_>,
        current: &McpInstance,
        definition: &InstanceDefinition,
    ) -> InstanceServiceResult<InstanceRevision>;

    /// Restarts the backing resource.
    async fn restart(
        &self,
        context: &StrategyContext<'_>,
        instance: &McpInstance,
    ) -> InstanceServiceResult<ContainerOperationOutcome>;

    /// Releases the backing resource before the record is removed.
    async fn teardown(
        &self,
        context: &StrategyContext<'_>,
        instance: &McpInstance,
    ) -> InstanceServiceResult<()>;

    /// Determines live health.
    async fn health(
        &self,
        context: &ProbeContext<'_>,
        instance: &McpInstance,
    ) -> InstanceServiceResult<HealthProbe>;
}

/// Returns the strategy serving `access_type`.
#[must_use]
pub fn strategy_for(access_type: AccessType) -> &'static dyn AccessStrategy {
    match access_type {
        AccessType::Direct => &DirectStrategy,
        AccessType::Proxy => &ProxyStrategy,
        AccessType::Hosting => &HostingStrategy,
    }
}

/// Passthrough to an externally running server.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectStrategy;

/// Passthrough behind a stable platform endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyStrategy;

/// Platform-run container in a Kubernetes environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostingStrategy;

fn plan_passthrough(
    context: &StrategyContext<'_>,
    access_type: AccessType,
    instance_id: McpInstanceId,
    definition: &InstanceDefinition,
) -> InstanceServiceResult<InstanceRevision> {
    let name = InstanceName::new(definition.name.as_str())?;
    let raw = definition
        .raw_mcp_servers()
        .ok_or(InstanceServiceError::MissingField("mcp_servers"))?;
    let validated = validate_server_config(raw)?;
    if validated.url().is_none() {
        return Err(InstanceServiceError::MissingUrl(access_type));
    }
    ensure_protocol(definition.mcp_protocol, &validated)?;

    let configs = context.synthesizer.synthesize(
        instance_id,
        access_type,
        definition.mcp_protocol,
        Some(&validated),
        None,
    )?;

    Ok(InstanceRevision {
        name,
        mcp_protocol: definition.mcp_protocol,
        source_config: validated.into_document(),
        configs,
        container: None,
    })
}

fn ensure_protocol(
    declared: McpProtocol,
    validated: &ValidatedServerConfig,
) -> InstanceServiceResult<()> {
    if validated.protocol() == declared {
        return Ok(());
    }
    Err(InstanceServiceError::ProtocolMismatch {
        declared,
        inferred: validated.protocol(),
    })
}

async fn probe_target(context: &ProbeContext<'_>, instance: &McpInstance) -> HealthProbe {
    let url = validate_server_document(instance.target_config().clone())
        .ok()
        .and_then(|validated| validated.url().map(ToOwned::to_owned));
    let Some(target_url) = url else {
        return HealthProbe::Endpoint {
            probe_http: false,
            detail: Some("target configuration has no url".to_owned()),
        };
    };

    let outcome = context
        .endpoint_probe
        .probe(&target_url, context.probe_timeout)
        .await;
    HealthProbe::Endpoint {
        probe_http: outcome.reachable,
        detail: outcome.detail,
    }
}

macro_rules! passthrough_strategy {
    ($strategy:ty, $access_type:expr) => {
        #[async_trait]
        impl AccessStrategy for $strategy {
            fn access_type(&self) -> AccessType {
                $access_type
            }

            async fn plan(
                &self,
                context: &StrategyContext<'_>,
                instance_id: McpInstanceId,
                definition: &InstanceDefinition,
            ) -> InstanceServiceResult<InstanceRevision> {
                plan_passthrough(context, $access_type, instance_id, definition)
            }

            async fn revise(
                &self,
                context: &StrategyContext<'_>,
                current: &McpInstance,
                definition: &InstanceDefinition,
            ) -> InstanceServiceResult<InstanceRevision> {
                plan_passthrough(context, $access_type, current.id(), definition)
            }

            async fn restart(
                &self,
                _context: &StrategyContext<'_>,
                _instance: &McpInstance,
            ) -> InstanceServiceResult<ContainerOperationOutcome> {
                Err(InstanceServiceError::RestartNotSupported($access_type))
            }

            async fn teardown(
                &self,
                _context: &StrategyContext<'_>,
                _instance: &McpInstance,
            ) -> InstanceServiceResult<()> {
                Ok(())
            }

            async fn health(
                &self,
                context: &ProbeContext<'_>,
                instance: &McpInstance,
            ) -> InstanceServiceResult<HealthProbe> {
                Ok(probe_target(context, instance).await)
            }
        }
    };
}

passthrough_strategy!(DirectStrategy, AccessType::Direct);
passthrough_strategy!(ProxyStrategy, AccessType::Proxy);

/// Validated hosting inputs ready for deployment.
struct HostingPlan {
    revision: InstanceRevision,
    options: ContainerOptions,
    environment: Environment,
    startup_timeout: Option<Duration>,
}

impl HostingStrategy {
    async fn prepare(
        context: &StrategyContext<'_>,
        instance_id: McpInstanceId,
        definition: &InstanceDefinition,
        generation: u32,
    ) -> InstanceServiceResult<HostingPlan> {
        let name = InstanceName::new(definition.name.as_str())?;
        let settings = definition
            .hosting
            .clone()
            .ok_or(InstanceServiceError::MissingField("hosting"))?;
        let spec = HostingSpec::try_from(settings)?;
        let protocol = definition.mcp_protocol;
        let builtin_runtime = spec.uses_runtime_image(&context.config.hosting_runtime_images);
        if protocol == McpProtocol::Stdio && !builtin_runtime {
            return Err(ProxySynthesisError::StdioRequiresHostingRuntime.into());
        }

        let environment_id = spec.environment_id();
        let environment = context
            .environments
            .get(environment_id)
            .await?
            .ok_or(InstanceServiceError::EnvironmentNotFound(environment_id))?;
        if environment.environment_type() != EnvironmentType::Kubernetes {
            return Err(InstanceServiceError::UnsupportedEnvironment {
                environment_id,
                environment_type: environment.environment_type(),
            });
        }

        let validated = match (protocol, definition.raw_mcp_servers()) {
            (McpProtocol::Stdio, None) => {
                return Err(InstanceServiceError::MissingField("mcp_servers"));
            }
            (_, Some(raw)) => {
                let validated = validate_server_config(raw)?;
                ensure_protocol(protocol, &validated)?;
                Some(validated)
            }
            (McpProtocol::Sse | McpProtocol::StreamableHttp, None) => None,
        };

        let options = context.coordinator.build_options(&ContainerBuildRequest {
            instance_id,
            protocol,
            spec: spec.clone(),
            stdio_command: validated
                .as_ref()
                .and_then(ValidatedServerConfig::stdio)
                .map(|stdio| stdio.command_line()),
            namespace: environment.namespace().to_owned(),
            generation,
        })?;

        let service_key = validated.as_ref().map_or_else(
            || service_key_from_name(&name),
            |config| config.service_name().to_owned(),
        );
        let target = HostingTarget {
            service_key,
            service_name: options.service_name.clone(),
            namespace: options.namespace.clone(),
            port: options.port,
            builtin_runtime,
            access_token: spec.tokens().first().cloned(),
        };
        let configs = context.synthesizer.synthesize(
            instance_id,
            AccessType::Hosting,
            protocol,
            None,
            Some(&target),
        )?;

        let source_config = validated.map_or_else(
            || configs.target_config.clone(),
            ValidatedServerConfig::into_document,
        );
        let startup_timeout = spec.timeouts().startup_limit();
        let container = HostedContainer::pending(
            spec,
            options.container_name.clone(),
            options.service_name.clone(),
        )
        .with_generation(generation);

        Ok(HostingPlan {
            revision: InstanceRevision {
                name,
                mcp_protocol: protocol,
                source_config,
                configs,
                container: Some(container),
            },
            options,
            environment,
            startup_timeout,
        })
    }

    async fn deploy(
        context: &StrategyContext<'_>,
        plan: HostingPlan,
    ) -> InstanceServiceResult<InstanceRevision> {
        context
            .coordinator
            .create(&plan.options, &plan.environment, plan.startup_timeout)
            .await?;
        Ok(plan.revision)
    }
}

/// Derives an `mcpServers` key from an instance name.
fn service_key_from_name(name: &InstanceName) -> String {
    let key: String = name
        .as_str()
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '_' | '-') {
                character
            } else {
                '-'
            }
        })
        .collect();
    if key.starts_with(|character: char| character.is_ascii_digit()) {
        format!("mcp-{key}")
    } else {
        key
    }
}

#[async_trait]
impl AccessStrategy for HostingStrategy {
    fn access_type(&self) -> AccessType {
        AccessType::Hosting
    }

    async fn plan(
        &self,
        context: &StrategyContext<'_>,
        instance_id: McpInstanceId,
        definition: &InstanceDefinition,
    ) -> InstanceServiceResult<InstanceRevision> {
        let plan = Self::prepare(context, instance_id, definition, 0).await?;
        Self::deploy(context, plan).await
    }

    async fn revise(
        &self,
        context: &StrategyContext<'_>,
        current: &McpInstance,
        definition: &InstanceDefinition,
    ) -> InstanceServiceResult<InstanceRevision> {
        let generation = current
            .container()
            .map_or(0, HostedContainer::next_generation);
        let plan = Self::prepare(context, current.id(), definition, generation).await?;
        let revision = Self::deploy(context, plan).await?;
        if let Err(err) = context.coordinator.delete(current).await {
            warn!(
                instance_id = %current.id(),
                error = %err,
                "replaced container could not be removed"
            );
        }
        Ok(revision)
    }

    async fn restart(
        &self,
        context: &StrategyContext<'_>,
        instance: &McpInstance,
    ) -> InstanceServiceResult<ContainerOperationOutcome> {
        Ok(context.coordinator.restart(instance).await?)
    }

    async fn teardown(
        &self,
        context: &StrategyContext<'_>,
        instance: &McpInstance,
    ) -> InstanceServiceResult<()> {
        Ok(context.coordinator.delete(instance).await?)
    }

    async fn health(
        &self,
        context: &ProbeContext<'_>,
        instance: &McpInstance,
    ) -> InstanceServiceResult<HealthProbe> {
        Ok(HealthProbe::Container(
            context.coordinator.status(instance).await?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("files", "files")]
    #[case("my files", "my-files")]
    #[case("42-tools", "mcp-42-tools")]
    fn service_keys_are_valid_identifiers(#[case] name: &str, #[case] expected: &str) {
        let instance_name = InstanceName::new(name).expect("valid name");
        assert_eq!(service_key_from_name(&instance_name), expected);
    }

    #[rstest]
    #[case(AccessType::Direct)]
    #[case(AccessType::Proxy)]
    #[case(AccessType::Hosting)]
    fn strategy_matches_access_type(#[case] access_type: AccessType) {
        assert_eq!(strategy_for(access_type).access_type(), access_type);
    }
}
