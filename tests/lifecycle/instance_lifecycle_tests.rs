//! Lifecycle flows across the three access modes.

use super::helpers::{TestContext, context, network_servers, runtime_hosting, stdio_servers};
use mcp_conductor::instance::{
    adapters::CoordinatorOperation,
    domain::{AccessType, ContainerStatus, InstanceStatus, McpProtocol},
    services::{
        CreateInstanceRequest, EditInstanceRequest, InstanceDefinition, InstanceErrorKind,
        InstanceServiceError,
    },
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn direct_instance_passes_its_configuration_through(context: TestContext) {
    let request = CreateInstanceRequest::new(
        AccessType::Direct,
        InstanceDefinition::new("weather", McpProtocol::Sse)
            .with_mcp_servers(network_servers("weather", "sse", "http://x/sse")),
    );

    let instance = context
        .orchestrator
        .create(request)
        .await
        .expect("direct instance should be created");

    assert_eq!(instance.target_config(), instance.source_config());
    assert_eq!(instance.public_proxy_config(), instance.source_config());
    assert_eq!(
        instance.source_config(),
        &json!({"mcpServers": {"weather": {"url": "http://x/sse", "type": "sse"}}})
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hosted_stdio_instance_is_published_over_sse(context: TestContext) {
    let request = CreateInstanceRequest::new(
        AccessType::Hosting,
        InstanceDefinition::new("fs", McpProtocol::Stdio)
            .with_mcp_servers(stdio_servers("fs", "node server.js"))
            .with_hosting(runtime_hosting()),
    );

    let instance = context
        .orchestrator
        .create(request)
        .await
        .expect("hosted instance should be created");

    assert_eq!(instance.mcp_protocol(), McpProtocol::Stdio);
    assert_eq!(
        instance.public_proxy_config()["mcpServers"]["fs"]["type"],
        json!("sse")
    );
    let public_url = instance.public_proxy_config()["mcpServers"]["fs"]["url"]
        .as_str()
        .expect("public config has a url");
    assert!(public_url.ends_with(&format!("/mcp/{}/sse", instance.id())));

    let stored = context
        .orchestrator
        .find_by_name("fs")
        .await
        .expect("lookup should succeed")
        .expect("instance should be stored");
    assert_eq!(stored, instance);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hosted_network_instance_keeps_its_protocol(context: TestContext) {
    let request = CreateInstanceRequest::new(
        AccessType::Hosting,
        InstanceDefinition::new("search api", McpProtocol::StreamableHttp)
            .with_hosting(runtime_hosting()),
    );

    let instance = context
        .orchestrator
        .create(request)
        .await
        .expect("hosted instance should be created");

    let target = &instance.target_config()["mcpServers"]["search-api"];
    assert_eq!(target["type"], json!("streamable-http"));
    assert!(
        target["url"]
            .as_str()
            .expect("target has a url")
            .ends_with(".mcp.svc.cluster.local:8080/mcp")
    );
    assert_eq!(instance.source_config(), instance.target_config());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hosted_instance_with_token_publishes_bearer_header(context: TestContext) {
    let mut hosting = runtime_hosting();
    hosting.tokens = vec!["s3cret".to_owned()];
    let request = CreateInstanceRequest::new(
        AccessType::Hosting,
        InstanceDefinition::new("fs", McpProtocol::Stdio)
            .with_mcp_servers(stdio_servers("fs", "node server.js"))
            .with_hosting(hosting),
    );

    let instance = context
        .orchestrator
        .create(request)
        .await
        .expect("hosted instance should be created");

    assert_eq!(
        instance.public_proxy_config()["mcpServers"]["fs"]["headers"]["Authorization"],
        json!("Bearer s3cret")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_failure_keeps_the_hosted_instance(context: TestContext) {
    let request = CreateInstanceRequest::new(
        AccessType::Hosting,
        InstanceDefinition::new("fs", McpProtocol::Stdio)
            .with_mcp_servers(stdio_servers("fs", "node server.js"))
            .with_hosting(runtime_hosting()),
    );
    let instance = context
        .orchestrator
        .create(request)
        .await
        .expect("hosted instance should be created");
    context
        .coordinator
        .set_failing(CoordinatorOperation::Delete, true)
        .expect("failure injection should succeed");

    let err = context
        .orchestrator
        .delete(instance.id())
        .await
        .expect_err("delete should surface the container failure");

    assert!(matches!(err, InstanceServiceError::Container(_)));
    assert_eq!(err.kind(), InstanceErrorKind::Dependency);
    let remaining = context
        .orchestrator
        .list_all()
        .await
        .expect("listing should succeed");
    assert_eq!(remaining.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_hosted_lifecycle(context: TestContext) {
    let created = context
        .orchestrator
        .create(CreateInstanceRequest::new(
            AccessType::Hosting,
            InstanceDefinition::new("fs", McpProtocol::Stdio)
                .with_mcp_servers(stdio_servers("fs", "node server.js"))
                .with_hosting(runtime_hosting()),
        ))
        .await
        .expect("hosted instance should be created");

    let edited = context
        .orchestrator
        .edit(
            EditInstanceRequest::new(
                created.id(),
                InstanceDefinition::new("fs-renamed", McpProtocol::Stdio)
                    .with_mcp_servers(stdio_servers("fs", "node server.js --readonly"))
                    .with_hosting(runtime_hosting()),
            )
            .with_access_type(AccessType::Hosting),
        )
        .await
        .expect("edit should succeed");
    assert_eq!(edited.name().as_str(), "fs-renamed");
    assert_eq!(edited.container_status(), Some(ContainerStatus::Pending));

    let disabled = context
        .orchestrator
        .disable(created.id())
        .await
        .expect("disable should succeed");
    assert_eq!(disabled.status(), InstanceStatus::Inactive);
    assert!(disabled.container().is_some());

    let restarted = context
        .orchestrator
        .restart(created.id())
        .await
        .expect("restart should succeed");
    assert_eq!(restarted.status(), InstanceStatus::Active);
    assert_eq!(restarted.container_status(), Some(ContainerStatus::Pending));

    context
        .orchestrator
        .delete(created.id())
        .await
        .expect("delete should succeed");
    assert!(
        context
            .coordinator
            .container_names()
            .expect("container names should be readable")
            .is_empty()
    );
    assert!(
        context
            .orchestrator
            .list_all()
            .await
            .expect("listing should succeed")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rename_onto_existing_name_is_a_conflict(context: TestContext) {
    for name in ["alpha", "beta"] {
        context
            .orchestrator
            .create(CreateInstanceRequest::new(
                AccessType::Proxy,
                InstanceDefinition::new(name, McpProtocol::Sse)
                    .with_mcp_servers(network_servers(name, "sse", "http://x/sse")),
            ))
            .await
            .expect("instance should be created");
    }
    let beta = context
        .orchestrator
        .find_by_name("beta")
        .await
        .expect("lookup should succeed")
        .expect("beta should exist");

    let err = context
        .orchestrator
        .edit(EditInstanceRequest::new(
            beta.id(),
            InstanceDefinition::new("alpha", McpProtocol::Sse)
                .with_mcp_servers(network_servers("beta", "sse", "http://x/sse")),
        ))
        .await
        .expect_err("rename onto an existing name should fail");

    assert_eq!(err.kind(), InstanceErrorKind::Conflict);
}
