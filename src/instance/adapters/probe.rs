//! Network probe for passthrough MCP endpoints.

use crate::instance::ports::{EndpointProbe, ProbeOutcome};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};
use url::Url;

/// Probes endpoints with a TCP connect followed by an optional HTTP request.
///
/// Both steps share one deadline. Any HTTP response counts as reachable,
/// since MCP endpoints routinely reject bare `GET` requests.
#[derive(Debug, Clone)]
pub struct TcpEndpointProbe {
    http_client: Option<Client>,
}

impl TcpEndpointProbe {
    /// Creates a probe, with the HTTP step when `http_probe` is set.
    #[must_use]
    pub fn new(http_probe: bool) -> Self {
        if http_probe {
            Self::with_http()
        } else {
            Self::tcp_only()
        }
    }

    /// Creates a probe that only checks TCP connectivity.
    #[must_use]
    pub const fn tcp_only() -> Self {
        Self { http_client: None }
    }

    /// Creates a probe that follows the TCP connect with an HTTP request.
    ///
    /// Falls back to TCP-only probing when no HTTP client can be built.
    #[must_use]
    pub fn with_http() -> Self {
        match Client::builder().build() {
            Ok(client) => Self {
                http_client: Some(client),
            },
            Err(err) => {
                warn!(error = %err, "HTTP client unavailable; probing TCP only");
                Self::tcp_only()
            }
        }
    }

    async fn request(&self, url: &Url, deadline: Instant) -> ProbeOutcome {
        let Some(client) = &self.http_client else {
            return ProbeOutcome::reachable();
        };
        if !matches!(url.scheme(), "http" | "https") {
            return ProbeOutcome::reachable();
        }

        match timeout_at(deadline, client.get(url.clone()).send()).await {
            Ok(Ok(response)) => {
                ProbeOutcome::reachable().with_detail(format!("HTTP {}", response.status()))
            }
            Ok(Err(err)) => ProbeOutcome::unreachable(format!("HTTP request failed: {err}")),
            Err(_) => ProbeOutcome::unreachable("HTTP request timed out"),
        }
    }
}

impl Default for TcpEndpointProbe {
    fn default() -> Self {
        Self::with_http()
    }
}

#[async_trait]
impl EndpointProbe for TcpEndpointProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => return ProbeOutcome::unreachable(format!("invalid URL: {err}")),
        };
        let Some(host) = parsed.host_str() else {
            return ProbeOutcome::unreachable("URL has no host");
        };
        let Some(port) = parsed.port_or_known_default() else {
            return ProbeOutcome::unreachable("URL has no port");
        };

        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return ProbeOutcome::unreachable("timeout is out of range");
        };
        let outcome = match timeout_at(deadline, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => {
                // Single-threaded servers would otherwise block on this connection.
                drop(stream);
                self.request(&parsed, deadline).await
            }
            Ok(Err(err)) => ProbeOutcome::unreachable(format!("TCP connection failed: {err}")),
            Err(_) => ProbeOutcome::unreachable(format!(
                "TCP connection timed out after {}s",
                timeout.as_secs()
            )),
        };

        debug!(url, reachable = outcome.reachable, detail = ?outcome.detail, "endpoint probed");
        outcome
    }
}
