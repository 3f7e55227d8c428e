//! Target and public proxy configuration synthesis.
//!
//! The *target* configuration says where the platform routes traffic; the
//! *public proxy* configuration is what external clients are told to use.
//! Direct instances expose their upstream unchanged, proxied instances hide
//! it behind a stable platform endpoint, and hosted instances point at an
//! in-cluster service while exposing an upgraded protocol publicly.

use super::{AccessType, McpInstanceId, McpProtocol, ProxySynthesisError, ValidatedServerConfig};
use serde_json::{Map, Value, json};

/// In-cluster service allocated for a hosted container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingTarget {
    /// Name of the single entry written under `mcpServers`.
    pub service_key: String,
    /// Kubernetes service name.
    pub service_name: String,
    /// Namespace the service lives in.
    pub namespace: String,
    /// Service port.
    pub port: u16,
    /// Whether the image is the platform's built-in hosting runtime.
    pub builtin_runtime: bool,
    /// Token attached to the public endpoint, if any.
    pub access_token: Option<String>,
}

/// Derived configuration pair stored on an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedConfigs {
    /// Where traffic is actually routed.
    pub target_config: Value,
    /// What external clients connect to.
    pub public_proxy_config: Value,
}

/// Builds target and public proxy configurations per access type.
///
/// Output depends only on the inputs, so repeated synthesis for the same
/// instance yields identical documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfigSynthesizer {
    public_base_url: String,
    cluster_domain: String,
}

impl ProxyConfigSynthesizer {
    /// Creates a synthesizer.
    ///
    /// `public_base_url` is the externally reachable proxy origin and
    /// `cluster_domain` the DNS suffix of in-cluster services.
    #[must_use]
    pub fn new(public_base_url: impl Into<String>, cluster_domain: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
            cluster_domain: cluster_domain.into().trim_matches('.').to_owned(),
        }
    }

    /// Synthesizes the configuration pair for an instance.
    ///
    /// `protocol` is the declared protocol. Passthrough access types require
    /// `source`; hosting requires `hosting`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxySynthesisError`] when a required input is missing or a
    /// stdio server is hosted outside the built-in runtime.
    pub fn synthesize(
        &self,
        instance_id: McpInstanceId,
        access_type: AccessType,
        protocol: McpProtocol,
        source: Option<&ValidatedServerConfig>,
        hosting: Option<&HostingTarget>,
    ) -> Result<SynthesizedConfigs, ProxySynthesisError> {
        match access_type {
            AccessType::Direct => {
                let validated = source.ok_or(ProxySynthesisError::MissingSourceConfig("direct"))?;
                Ok(SynthesizedConfigs {
                    target_config: validated.document().clone(),
                    public_proxy_config: validated.document().clone(),
                })
            }
            AccessType::Proxy => {
                let validated = source.ok_or(ProxySynthesisError::MissingSourceConfig("proxy"))?;
                Ok(SynthesizedConfigs {
                    target_config: validated.document().clone(),
                    public_proxy_config: self.public_endpoint(
                        instance_id,
                        validated.service_name(),
                        protocol,
                        None,
                    ),
                })
            }
            AccessType::Hosting => {
                let target = hosting.ok_or(ProxySynthesisError::MissingHostingTarget)?;
                self.synthesize_hosting(instance_id, protocol, target)
            }
        }
    }

    fn synthesize_hosting(
        &self,
        instance_id: McpInstanceId,
        protocol: McpProtocol,
        target: &HostingTarget,
    ) -> Result<SynthesizedConfigs, ProxySynthesisError> {
        let target_protocol = match protocol {
            McpProtocol::Stdio if target.builtin_runtime => McpProtocol::Sse,
            McpProtocol::Stdio => return Err(ProxySynthesisError::StdioRequiresHostingRuntime),
            McpProtocol::Sse | McpProtocol::StreamableHttp => protocol,
        };

        let internal_url = format!(
            "http://{}.{}.{}:{}{}",
            target.service_name,
            target.namespace,
            self.cluster_domain,
            target.port,
            endpoint_path(target_protocol),
        );

        Ok(SynthesizedConfigs {
            target_config: endpoint_document(&target.service_key, target_protocol, &internal_url, None),
            public_proxy_config: self.public_endpoint(
                instance_id,
                &target.service_key,
                protocol.upgraded(),
                target.access_token.as_deref(),
            ),
        })
    }

    /// Returns the public URL clients use for the instance.
    #[must_use]
    pub fn public_url(&self, instance_id: McpInstanceId, protocol: McpProtocol) -> String {
        format!(
            "{}/mcp/{instance_id}{}",
            self.public_base_url,
            endpoint_path(protocol.upgraded()),
        )
    }

    fn public_endpoint(
        &self,
        instance_id: McpInstanceId,
        service_key: &str,
        protocol: McpProtocol,
        access_token: Option<&str>,
    ) -> Value {
        endpoint_document(
            service_key,
            protocol,
            &self.public_url(instance_id, protocol),
            access_token,
        )
    }
}

const fn endpoint_path(protocol: McpProtocol) -> &'static str {
    match protocol {
        McpProtocol::Stdio | McpProtocol::Sse => "/sse",
        McpProtocol::StreamableHttp => "/mcp",
    }
}

fn endpoint_document(
    service_key: &str,
    protocol: McpProtocol,
    url: &str,
    access_token: Option<&str>,
) -> Value {
    let mut entry = Map::new();
    entry.insert("type".to_owned(), Value::from(protocol.config_name()));
    entry.insert("url".to_owned(), Value::from(url));
    if let Some(token) = access_token {
        entry.insert(
            "headers".to_owned(),
            json!({ "Authorization": format!("Bearer {token}") }),
        );
    }

    let mut servers = Map::new();
    servers.insert(service_key.to_owned(), Value::Object(entry));
    json!({ "mcpServers": servers })
}
