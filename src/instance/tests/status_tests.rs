//! Tests pinning which collaborator each access mode consults for health.

use super::fixtures::{hosting_settings, sse_servers};
use crate::instance::{
    domain::{
        AccessType, ContainerStatus, ContainerStatusReport, HostedContainer, HostingSpec,
        InstanceName, InstanceStatus, McpInstance, McpInstanceId, McpProtocol,
        PersistedMcpInstanceData,
    },
    ports::{ContainerCoordinatorError, MockContainerCoordinator, MockEndpointProbe, ProbeOutcome},
    services::{HealthProbe, InstanceServiceError, StatusProbe},
};
use chrono::Utc;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

fn persisted(access_type: AccessType, target_config: Value, container: Option<HostedContainer>) -> McpInstance {
    let now = Utc::now();
    McpInstance::from_persisted(PersistedMcpInstanceData {
        id: McpInstanceId::new(),
        name: InstanceName::new("search").expect("valid name"),
        access_type,
        mcp_protocol: McpProtocol::Sse,
        source_config: target_config.clone(),
        target_config: target_config.clone(),
        public_proxy_config: target_config,
        status: InstanceStatus::Active,
        container,
        status_message: None,
        created_at: now,
        updated_at: now,
    })
}

fn passthrough_instance(access_type: AccessType) -> McpInstance {
    let document: Value = serde_json::from_str(&sse_servers("search", "http://upstream:9000/sse"))
        .expect("fixture document is valid JSON");
    persisted(access_type, document, None)
}

fn hosted_instance() -> McpInstance {
    let spec = HostingSpec::try_from(hosting_settings()).expect("valid hosting settings");
    let container = HostedContainer::pending(spec, "mcp-files", "mcp-svc-files");
    persisted(
        AccessType::Hosting,
        json!({"mcpServers": {"files": {"type": "sse", "url": "http://mcp-svc-files.tools.svc.cluster.local:8000/sse"}}}),
        Some(container),
    )
}

fn status_probe(
    coordinator: MockContainerCoordinator,
    endpoint_probe: MockEndpointProbe,
) -> StatusProbe<MockContainerCoordinator, MockEndpointProbe> {
    StatusProbe::new(Arc::new(coordinator), Arc::new(endpoint_probe), PROBE_TIMEOUT)
}

#[tokio::test(flavor = "multi_thread")]
async fn hosted_health_never_touches_the_network() {
    let mut coordinator = MockContainerCoordinator::new();
    coordinator
        .expect_status()
        .times(1)
        .returning(|_| Ok(ContainerStatusReport::new(ContainerStatus::Running, true)));
    let mut endpoint_probe = MockEndpointProbe::new();
    endpoint_probe.expect_probe().never();

    let report = status_probe(coordinator, endpoint_probe)
        .check(&hosted_instance())
        .await
        .expect("hosted status should succeed");

    assert_eq!(report.access_type, AccessType::Hosting);
    assert_eq!(
        report.probe,
        HealthProbe::Container(ContainerStatusReport::new(ContainerStatus::Running, true))
    );
}

#[rstest]
#[case::direct(AccessType::Direct)]
#[case::proxy(AccessType::Proxy)]
#[tokio::test(flavor = "multi_thread")]
async fn passthrough_health_never_touches_the_coordinator(#[case] access_type: AccessType) {
    let coordinator = MockContainerCoordinator::new();
    let mut endpoint_probe = MockEndpointProbe::new();
    endpoint_probe
        .expect_probe()
        .withf(|url, timeout| url.starts_with("http://upstream:9000") && *timeout == PROBE_TIMEOUT)
        .times(1)
        .returning(|_, _| ProbeOutcome::reachable().with_detail("HTTP 405 Method Not Allowed"));

    let report = status_probe(coordinator, endpoint_probe)
        .check(&passthrough_instance(access_type))
        .await
        .expect("passthrough status should succeed");

    assert_eq!(report.access_type, access_type);
    assert!(report.probe.is_healthy());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_endpoint_is_reported_not_raised() {
    let mut endpoint_probe = MockEndpointProbe::new();
    endpoint_probe
        .expect_probe()
        .times(1)
        .returning(|_, _| ProbeOutcome::unreachable("TCP connection timed out after 3s"));

    let report = status_probe(MockContainerCoordinator::new(), endpoint_probe)
        .check(&passthrough_instance(AccessType::Direct))
        .await
        .expect("unreachable endpoints are not errors");

    assert_eq!(
        report.probe,
        HealthProbe::Endpoint {
            probe_http: false,
            detail: Some("TCP connection timed out after 3s".to_owned()),
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn target_without_url_is_unhealthy_without_probing() {
    let mut endpoint_probe = MockEndpointProbe::new();
    endpoint_probe.expect_probe().never();
    let instance = persisted(AccessType::Proxy, json!({"mcpServers": {}}), None);

    let report = status_probe(MockContainerCoordinator::new(), endpoint_probe)
        .check(&instance)
        .await
        .expect("status should succeed");

    assert!(!report.probe.is_healthy());
}

#[tokio::test(flavor = "multi_thread")]
async fn coordinator_failure_surfaces_for_hosted_instances() {
    let mut coordinator = MockContainerCoordinator::new();
    coordinator
        .expect_status()
        .times(1)
        .returning(|_| Err(ContainerCoordinatorError::NotFound("mcp-files".to_owned())));

    let result = status_probe(coordinator, MockEndpointProbe::new())
        .check(&hosted_instance())
        .await;

    assert!(matches!(
        result,
        Err(InstanceServiceError::Container(ContainerCoordinatorError::NotFound(_)))
    ));
}
