//! MCP instance aggregate root.

use super::{
    AccessType, ContainerStatus, ContainerStatusReport, HostedContainer, HostingSpec,
    InstanceDomainError, InstanceName, InstanceStatus, McpInstanceId, McpProtocol,
    SynthesizedConfigs,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fully derived state of an instance about to be created.
///
/// The identifier is allocated before synthesis because the public endpoint
/// embeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDraft {
    /// Pre-allocated identifier.
    pub id: McpInstanceId,
    /// Validated name.
    pub name: InstanceName,
    /// Access mode, fixed for the lifetime of the instance.
    pub access_type: AccessType,
    /// Declared protocol.
    pub mcp_protocol: McpProtocol,
    /// Configuration document as submitted.
    pub source_config: Value,
    /// Derived target and public configuration.
    pub configs: SynthesizedConfigs,
    /// Container state for hosted instances.
    pub container: Option<HostedContainer>,
}

/// Re-derived state applied to an existing instance by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRevision {
    /// Validated name.
    pub name: InstanceName,
    /// Declared protocol.
    pub mcp_protocol: McpProtocol,
    /// Configuration document as submitted.
    pub source_config: Value,
    /// Derived target and public configuration.
    pub configs: SynthesizedConfigs,
    /// Container state for hosted instances.
    pub container: Option<HostedContainer>,
}

/// Parameter object for reconstructing persisted instance state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMcpInstanceData {
    /// Persisted instance identifier.
    pub id: McpInstanceId,
    /// Persisted name.
    pub name: InstanceName,
    /// Persisted access mode.
    pub access_type: AccessType,
    /// Persisted protocol.
    pub mcp_protocol: McpProtocol,
    /// Persisted source configuration.
    pub source_config: Value,
    /// Persisted target configuration.
    pub target_config: Value,
    /// Persisted public proxy configuration.
    pub public_proxy_config: Value,
    /// Persisted enabled state.
    pub status: InstanceStatus,
    /// Persisted container state.
    pub container: Option<HostedContainer>,
    /// Persisted status message.
    pub status_message: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Registered MCP service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpInstance {
    #[serde(rename = "instanceId")]
    id: McpInstanceId,
    name: InstanceName,
    access_type: AccessType,
    mcp_protocol: McpProtocol,
    source_config: Value,
    target_config: Value,
    public_proxy_config: Value,
    status: InstanceStatus,
    #[serde(rename = "hosting", default, skip_serializing_if = "Option::is_none")]
    container: Option<HostedContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl McpInstance {
    /// Creates an active instance from a draft.
    #[must_use]
    pub fn new(draft: InstanceDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: draft.id,
            name: draft.name,
            access_type: draft.access_type,
            mcp_protocol: draft.mcp_protocol,
            source_config: draft.source_config,
            target_config: draft.configs.target_config,
            public_proxy_config: draft.configs.public_proxy_config,
            status: InstanceStatus::Active,
            container: draft.container,
            status_message: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an instance from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedMcpInstanceData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            access_type: data.access_type,
            mcp_protocol: data.mcp_protocol,
            source_config: data.source_config,
            target_config: data.target_config,
            public_proxy_config: data.public_proxy_config,
            status: data.status,
            container: data.container,
            status_message: data.status_message,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the instance identifier.
    #[must_use]
    pub const fn id(&self) -> McpInstanceId {
        self.id
    }

    /// Returns the instance name.
    #[must_use]
    pub const fn name(&self) -> &InstanceName {
        &self.name
    }

    /// Returns the access mode.
    #[must_use]
    pub const fn access_type(&self) -> AccessType {
        self.access_type
    }

    /// Returns the declared protocol.
    #[must_use]
    pub const fn mcp_protocol(&self) -> McpProtocol {
        self.mcp_protocol
    }

    /// Returns the configuration document as submitted.
    #[must_use]
    pub const fn source_config(&self) -> &Value {
        &self.source_config
    }

    /// Returns where traffic is routed.
    #[must_use]
    pub const fn target_config(&self) -> &Value {
        &self.target_config
    }

    /// Returns what external clients connect to.
    #[must_use]
    pub const fn public_proxy_config(&self) -> &Value {
        &self.public_proxy_config
    }

    /// Returns the enabled state.
    #[must_use]
    pub const fn status(&self) -> InstanceStatus {
        self.status
    }

    /// Returns the container state of a hosted instance.
    #[must_use]
    pub const fn container(&self) -> Option<&HostedContainer> {
        self.container.as_ref()
    }

    /// Returns the hosting settings of a hosted instance.
    #[must_use]
    pub fn hosting_spec(&self) -> Option<&HostingSpec> {
        self.container.as_ref().map(HostedContainer::spec)
    }

    /// Returns the container status of a hosted instance.
    #[must_use]
    pub fn container_status(&self) -> Option<ContainerStatus> {
        self.container.as_ref().map(HostedContainer::container_status)
    }

    /// Returns whether the container passed its startup probe.
    ///
    /// Always `false` for instances without a container.
    #[must_use]
    pub fn container_is_ready(&self) -> bool {
        self.container
            .as_ref()
            .is_some_and(HostedContainer::container_is_ready)
    }

    /// Returns the latest explanatory status message.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces derived state after an edit.
    ///
    /// The identifier, access mode and enabled state are retained.
    pub fn apply_revision(&mut self, revision: InstanceRevision, clock: &impl Clock) {
        self.name = revision.name;
        self.mcp_protocol = revision.mcp_protocol;
        self.source_config = revision.source_config;
        self.target_config = revision.configs.target_config;
        self.public_proxy_config = revision.configs.public_proxy_config;
        self.container = revision.container;
        self.status_message = None;
        self.touch(clock);
    }

    /// Records a requested container restart.
    ///
    /// The instance becomes active and the container returns to pending and
    /// not ready until the coordinator reports otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceDomainError::NotHosted`] when the instance has no
    /// container.
    pub fn mark_restarting(
        &mut self,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), InstanceDomainError> {
        let container = self
            .container
            .as_mut()
            .ok_or(InstanceDomainError::NotHosted(self.id))?;
        container.reset_to_pending();
        self.status = InstanceStatus::Active;
        self.status_message = Some(message.into()).filter(|text| !text.trim().is_empty());
        self.touch(clock);
        Ok(())
    }

    /// Marks the instance inactive, returning whether the state changed.
    pub fn disable(&mut self, clock: &impl Clock) -> bool {
        self.set_status(InstanceStatus::Inactive, clock)
    }

    /// Marks the instance active, returning whether the state changed.
    pub fn enable(&mut self, clock: &impl Clock) -> bool {
        self.set_status(InstanceStatus::Active, clock)
    }

    /// Stores a coordinator status report, returning whether anything
    /// changed.
    ///
    /// Instances without a container ignore the report.
    pub fn record_container_status(
        &mut self,
        report: &ContainerStatusReport,
        clock: &impl Clock,
    ) -> bool {
        let Some(container) = self.container.as_mut() else {
            return false;
        };
        let mut changed = container.apply_report(report);
        if let Some(message) = report.message()
            && self.status_message.as_deref() != Some(message)
        {
            self.status_message = Some(message.to_owned());
            changed = true;
        }
        if changed {
            self.touch(clock);
        }
        changed
    }

    fn set_status(&mut self, target: InstanceStatus, clock: &impl Clock) -> bool {
        if self.status == target {
            return false;
        }
        self.status = target;
        self.touch(clock);
        true
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
