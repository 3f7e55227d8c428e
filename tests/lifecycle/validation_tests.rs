//! Rejected create requests leave no trace behind.

use super::helpers::{TestContext, context, network_servers, runtime_hosting, stdio_servers};
use mcp_conductor::instance::{
    domain::{AccessType, HostingSettings, InstanceDomainError, McpProtocol, ServerConfigError},
    services::{CreateInstanceRequest, InstanceDefinition, InstanceErrorKind, InstanceServiceError},
};
use rstest::rstest;
use serde_json::json;

async fn assert_nothing_stored(context: &TestContext) {
    let stored = context
        .orchestrator
        .list_all()
        .await
        .expect("listing should succeed");
    assert!(stored.is_empty());
    assert!(
        context
            .coordinator
            .container_names()
            .expect("container names should be readable")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn two_services_are_rejected(context: TestContext) {
    let document = json!({"mcpServers": {
        "a": {"url": "http://a/sse", "type": "sse"},
        "b": {"url": "http://b/sse", "type": "sse"},
    }});
    let request = CreateInstanceRequest::new(
        AccessType::Direct,
        InstanceDefinition::new("pair", McpProtocol::Sse).with_mcp_servers(document.to_string()),
    );

    let err = context
        .orchestrator
        .create(request)
        .await
        .expect_err("two services should be rejected");

    assert!(matches!(
        err,
        InstanceServiceError::Config(ServerConfigError::ServiceCount { found: 2 })
    ));
    assert_eq!(err.to_string(), "mcpServers must contain exactly one service.");
    assert_nothing_stored(&context).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn startup_timeout_below_floor_is_rejected(context: TestContext) {
    let mut hosting = runtime_hosting();
    hosting.startup_timeout = 10;
    let request = CreateInstanceRequest::new(
        AccessType::Hosting,
        InstanceDefinition::new("fs", McpProtocol::Stdio)
            .with_mcp_servers(stdio_servers("fs", "node server.js"))
            .with_hosting(hosting),
    );

    let err = context
        .orchestrator
        .create(request)
        .await
        .expect_err("short startup timeout should be rejected");

    assert!(matches!(
        err,
        InstanceServiceError::Domain(InstanceDomainError::StartupTimeoutOutOfRange(10))
    ));
    assert_eq!(err.kind(), InstanceErrorKind::Input);
    assert_nothing_stored(&context).await;
}

#[rstest]
#[case::not_json("{not json")]
#[case::missing_servers(r#"{"servers": {}}"#)]
#[case::servers_not_object(r#"{"mcpServers": []}"#)]
#[case::digit_service_name(r#"{"mcpServers": {"1fs": {"url": "http://x/sse"}}}"#)]
#[case::unknown_protocol(r#"{"mcpServers": {"fs": {"type": "websocket", "url": "ws://x"}}}"#)]
#[case::empty_url(r#"{"mcpServers": {"fs": {"type": "sse", "url": ""}}}"#)]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_documents_are_rejected(context: TestContext, #[case] document: &str) {
    let request = CreateInstanceRequest::new(
        AccessType::Proxy,
        InstanceDefinition::new("fs", McpProtocol::Sse).with_mcp_servers(document),
    );

    let err = context
        .orchestrator
        .create(request)
        .await
        .expect_err("malformed document should be rejected");

    assert!(matches!(err, InstanceServiceError::Config(_)), "unexpected error: {err}");
    assert_nothing_stored(&context).await;
}

#[rstest]
#[case::zero_port(HostingSettings { port: 0, ..runtime_hosting() })]
#[case::blank_image(HostingSettings { image_address: "  ".to_owned(), ..runtime_hosting() })]
#[case::non_positive_environment_id(HostingSettings { environment_id: 0, ..runtime_hosting() })]
#[case::running_timeout_too_long(HostingSettings { running_timeout: 100_000, ..runtime_hosting() })]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_hosting_settings_are_rejected(
    context: TestContext,
    #[case] hosting: HostingSettings,
) {
    let request = CreateInstanceRequest::new(
        AccessType::Hosting,
        InstanceDefinition::new("search", McpProtocol::Sse)
            .with_mcp_servers(network_servers("search", "sse", "http://x/sse"))
            .with_hosting(hosting),
    );

    let err = context
        .orchestrator
        .create(request)
        .await
        .expect_err("invalid hosting settings should be rejected");

    assert!(matches!(err, InstanceServiceError::Domain(_)), "unexpected error: {err}");
    assert_nothing_stored(&context).await;
}
