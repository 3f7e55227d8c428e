//! Live health determination for MCP instances.

use super::{
    error::InstanceServiceResult,
    strategy::{ProbeContext, strategy_for},
};
use crate::instance::{
    domain::{AccessType, ContainerStatusReport, InstanceStatus, McpInstance, McpInstanceId},
    ports::{ContainerCoordinator, EndpointProbe},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Evidence gathered about an instance's health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum HealthProbe {
    /// Container state reported by the coordinator.
    Container(ContainerStatusReport),
    /// Result of probing the upstream endpoint.
    Endpoint {
        /// Whether the endpoint was reachable.
        probe_http: bool,
        /// Failure reason or observed HTTP status.
        detail: Option<String>,
    },
}

impl HealthProbe {
    /// Returns whether the instance can currently serve traffic.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        match self {
            Self::Container(report) => report.is_ready(),
            Self::Endpoint { probe_http, .. } => *probe_http,
        }
    }
}

/// Health of one instance at the time of the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceHealthReport {
    /// Checked instance.
    pub instance_id: McpInstanceId,
    /// Access mode that selected the probing strategy.
    pub access_type: AccessType,
    /// Enabled state of the instance.
    pub status: InstanceStatus,
    /// Gathered evidence.
    pub probe: HealthProbe,
}

/// Determines live health using the strategy of each instance's access type.
///
/// Hosted instances ask the container coordinator and never touch the
/// network; passthrough instances are probed and never touch the
/// coordinator.
#[derive(Clone)]
pub struct StatusProbe<C, P>
where
    C: ContainerCoordinator,
    P: EndpointProbe,
{
    coordinator: Arc<C>,
    endpoint_probe: Arc<P>,
    probe_timeout: Duration,
}

impl<C, P> StatusProbe<C, P>
where
    C: ContainerCoordinator,
    P: EndpointProbe,
{
    /// Creates a status probe.
    #[must_use]
    pub const fn new(coordinator: Arc<C>, endpoint_probe: Arc<P>, probe_timeout: Duration) -> Self {
        Self {
            coordinator,
            endpoint_probe,
            probe_timeout,
        }
    }

    /// Returns a copy using a different network probe timeout.
    #[must_use]
    pub fn with_probe_timeout(&self, probe_timeout: Duration) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            endpoint_probe: Arc::clone(&self.endpoint_probe),
            probe_timeout,
        }
    }

    /// Returns the network probe timeout.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Checks the health of `instance`.
    ///
    /// Network failures are reported as an unreachable endpoint rather than
    /// as errors.
    ///
    /// # Errors
    ///
    /// Returns coordinator errors for hosted instances.
    pub async fn check(&self, instance: &McpInstance) -> InstanceServiceResult<InstanceHealthReport> {
        let context = ProbeContext {
            coordinator: &*self.coordinator,
            endpoint_probe: &*self.endpoint_probe,
            probe_timeout: self.probe_timeout,
        };
        let probe = strategy_for(instance.access_type())
            .health(&context, instance)
            .await?;

        debug!(
            instance_id = %instance.id(),
            access_type = %instance.access_type(),
            healthy = probe.is_healthy(),
            "instance health checked"
        );
        Ok(InstanceHealthReport {
            instance_id: instance.id(),
            access_type: instance.access_type(),
            status: instance.status(),
            probe,
        })
    }
}
