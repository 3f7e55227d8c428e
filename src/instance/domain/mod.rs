//! Domain model for MCP instance orchestration.
//!
//! The instance domain models access modes, wire protocols, server
//! configuration validation, hosting settings, proxy configuration synthesis,
//! and the [`McpInstance`] aggregate root. Infrastructure concerns remain
//! outside this boundary.

mod access;
mod environment;
mod error;
mod hosting;
mod ids;
mod instance;
mod proxy;
mod server_config;
mod status;

pub use access::{AccessType, McpProtocol};
pub use environment::{Environment, EnvironmentType};
pub use error::{
    InstanceDomainError, ParseInstanceValueError, ProxySynthesisError, ServerConfigError,
};
pub use hosting::{
    HostedContainer, HostingSettings, HostingSpec, HostingTimeouts, RUNNING_TIMEOUT_RANGE,
    STARTUP_TIMEOUT_RANGE, VolumeMount,
};
pub use ids::{EnvironmentId, InstanceName, McpInstanceId};
pub use instance::{InstanceDraft, InstanceRevision, McpInstance, PersistedMcpInstanceData};
pub use proxy::{HostingTarget, ProxyConfigSynthesizer, SynthesizedConfigs};
pub use server_config::{
    NetworkServerConfig, PresentFields, ServerEndpoint, StdioServerConfig, ValidatedServerConfig,
    validate_server_config, validate_server_document,
};
pub use status::{ContainerStatus, ContainerStatusReport, InstanceStatus};
