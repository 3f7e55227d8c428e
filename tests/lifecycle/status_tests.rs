//! Live health through the TCP endpoint probe.

use super::helpers::{TestContext, closed_endpoint_url, context, network_servers};
use mcp_conductor::instance::{
    domain::{AccessType, McpProtocol},
    services::{CreateInstanceRequest, HealthProbe, InstanceDefinition},
};
use rstest::rstest;
use tokio::net::TcpListener;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_proxy_target_reports_probe_failure(context: TestContext) {
    let request = CreateInstanceRequest::new(
        AccessType::Proxy,
        InstanceDefinition::new("offline", McpProtocol::Sse)
            .with_mcp_servers(network_servers("offline", "sse", &closed_endpoint_url())),
    );
    let instance = context
        .orchestrator
        .create(request)
        .await
        .expect("proxy instance should be created");

    let report = context
        .orchestrator
        .status(instance.id())
        .await
        .expect("an unreachable target is not an error");

    assert!(matches!(
        report.probe,
        HealthProbe::Endpoint {
            probe_http: false,
            detail: Some(_),
        }
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listening_direct_target_is_healthy(context: TestContext) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("loopback bind should succeed");
    let port = listener
        .local_addr()
        .expect("bound listener has an address")
        .port();
    let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });
    let request = CreateInstanceRequest::new(
        AccessType::Direct,
        InstanceDefinition::new("online", McpProtocol::Sse).with_mcp_servers(network_servers(
            "online",
            "sse",
            &format!("http://127.0.0.1:{port}/sse"),
        )),
    );
    let instance = context
        .orchestrator
        .create(request)
        .await
        .expect("direct instance should be created");

    let report = context
        .orchestrator
        .status(instance.id())
        .await
        .expect("status should succeed");

    assert!(report.probe.is_healthy());
    accept
        .await
        .expect("accept task should finish")
        .expect("probe connection should be accepted");
}
