//! Shared test helpers for in-memory orchestration tests.

use mcp_conductor::{
    config::OrchestratorConfig,
    instance::{
        adapters::{
            InMemoryContainerCoordinator, TcpEndpointProbe,
            memory::{InMemoryEnvironmentDirectory, InMemoryMcpInstanceRepository},
        },
        domain::{Environment, EnvironmentId, EnvironmentType, HostingSettings},
        services::InstanceOrchestrator,
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::json;
use std::net::TcpListener;
use std::sync::Arc;

/// Orchestrator wired to in-memory adapters and a TCP-only probe.
pub type TestOrchestrator = InstanceOrchestrator<
    InMemoryMcpInstanceRepository,
    InMemoryEnvironmentDirectory,
    InMemoryContainerCoordinator,
    TcpEndpointProbe,
    DefaultClock,
>;

/// Identifier of the Kubernetes environment every context provides.
pub const CLUSTER_ENVIRONMENT: i64 = 7;

/// Image of the built-in hosting runtime.
pub const RUNTIME_IMAGE: &str = "mcp-hosting-runtime:2.0";

/// Orchestrator together with handles on its in-memory collaborators.
pub struct TestContext {
    /// Container coordinator, for failure injection and inspection.
    pub coordinator: Arc<InMemoryContainerCoordinator>,
    /// Orchestrator under test.
    pub orchestrator: TestOrchestrator,
}

/// Provides an orchestrator with one Kubernetes environment registered.
#[fixture]
pub fn context() -> TestContext {
    let environments = Arc::new(InMemoryEnvironmentDirectory::new());
    environments
        .insert(Environment::new(
            EnvironmentId::new(CLUSTER_ENVIRONMENT).expect("valid environment id"),
            "staging",
            EnvironmentType::Kubernetes,
            "mcp",
        ))
        .expect("environment should be stored");
    let coordinator = Arc::new(InMemoryContainerCoordinator::new());
    let config = OrchestratorConfig {
        probe_timeout_secs: 2,
        ..OrchestratorConfig::tcp_only()
    };

    let orchestrator = InstanceOrchestrator::new(
        Arc::new(InMemoryMcpInstanceRepository::new()),
        environments,
        Arc::clone(&coordinator),
        Arc::new(TcpEndpointProbe::tcp_only()),
        Arc::new(DefaultClock),
    )
    .with_config(config)
    .expect("test configuration is valid");

    TestContext {
        coordinator,
        orchestrator,
    }
}

/// Builds an `mcpServers` document with one network service.
#[must_use]
pub fn network_servers(service: &str, protocol: &str, url: &str) -> String {
    json!({"mcpServers": {service: {"type": protocol, "url": url}}}).to_string()
}

/// Builds an `mcpServers` document with one stdio service.
#[must_use]
pub fn stdio_servers(service: &str, command: &str) -> String {
    json!({"mcpServers": {service: {"command": command}}}).to_string()
}

/// Hosting settings targeting the built-in runtime image.
#[must_use]
pub fn runtime_hosting() -> HostingSettings {
    HostingSettings {
        environment_id: CLUSTER_ENVIRONMENT,
        port: 8080,
        image_address: RUNTIME_IMAGE.to_owned(),
        ..HostingSettings::default()
    }
}

/// Returns a URL on a loopback port with no listener.
#[must_use]
pub fn closed_endpoint_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("loopback bind should succeed");
    let port = listener
        .local_addr()
        .expect("bound listener has an address")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{port}/sse")
}
