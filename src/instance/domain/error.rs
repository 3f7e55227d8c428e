//! Error types for instance domain validation and parsing.

use super::{McpInstanceId, McpProtocol};
use thiserror::Error;

/// Errors returned while constructing instance domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstanceDomainError {
    /// The instance name is empty after trimming.
    #[error("instance name must not be empty")]
    EmptyInstanceName,

    /// The instance name exceeds the 100-character storage limit.
    #[error("instance name exceeds 100 character limit: {0}")]
    InstanceNameTooLong(String),

    /// The hosting port is zero.
    #[error("port must be greater than zero")]
    InvalidPort,

    /// The environment identifier is not a positive number.
    #[error("environment id must be greater than zero (got {0})")]
    InvalidEnvironmentId(i64),

    /// The container image address is empty.
    #[error("image address must not be empty")]
    EmptyImageAddress,

    /// The startup timeout is outside `{0} ∪ [30, 3600]` seconds.
    #[error("startup timeout must be 0 or between 30 and 3600 seconds (got {0})")]
    StartupTimeoutOutOfRange(u32),

    /// The running timeout is outside `{0} ∪ [60, 86400]` seconds.
    #[error("running timeout must be 0 or between 60 and 86400 seconds (got {0})")]
    RunningTimeoutOutOfRange(u32),

    /// A volume mount has an empty container path.
    #[error("volume mount path must not be empty")]
    EmptyVolumeMountPath,

    /// The operation requires a hosted instance.
    #[error("MCP instance {0} is not a hosted instance")]
    NotHosted(McpInstanceId),
}

/// Errors returned by the MCP server configuration validator.
///
/// Each rule of the validator produces its own variant so callers can report
/// the exact violation back to the operator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServerConfigError {
    /// The payload is not valid JSON.
    #[error("invalid MCP server configuration JSON: {0}")]
    InvalidJson(String),

    /// The top-level `mcpServers` key is absent.
    #[error("configuration must contain a top-level mcpServers key")]
    MissingMcpServers,

    /// `mcpServers` is present but is not a JSON object.
    #[error("mcpServers must be a JSON object")]
    McpServersNotObject,

    /// `mcpServers` holds zero or several services.
    #[error("mcpServers must contain exactly one service.")]
    ServiceCount {
        /// Number of services found.
        found: usize,
    },

    /// The service name does not match `^[A-Za-z_-][A-Za-z0-9_-]*$`.
    #[error(
        "service name '{0}' is invalid (letters, digits, '_' and '-' only, must not start with a digit)"
    )]
    InvalidServiceName(String),

    /// The service entry is not a JSON object.
    #[error("configuration for service '{0}' must be a JSON object")]
    ServiceEntryNotObject(String),

    /// A field has the wrong JSON shape.
    #[error("field '{field}' {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Shape requirement that was violated.
        reason: &'static str,
    },

    /// None of `type`, `transport`, `url` or `command` determine a protocol.
    #[error("unable to determine the MCP protocol for service '{0}'")]
    UndeterminedProtocol(String),

    /// The declared protocol is not one of `stdio`, `sse` or `streamable-http`.
    #[error("unsupported MCP protocol type: {0}")]
    UnsupportedProtocol(String),

    /// A network protocol was resolved but no URL was given.
    #[error("{protocol} services require a non-empty url")]
    MissingUrl {
        /// Resolved protocol.
        protocol: McpProtocol,
    },

    /// The stdio protocol was resolved but no command was given.
    #[error("stdio services require a non-empty command")]
    MissingCommand,
}

/// Errors returned while synthesizing target and public proxy configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProxySynthesisError {
    /// Passthrough access modes need a validated source configuration.
    #[error("{0} instances require a validated source configuration")]
    MissingSourceConfig(&'static str),

    /// Hosting synthesis needs the allocated container service.
    #[error("hosting instances require an allocated container service")]
    MissingHostingTarget,

    /// Stdio servers can only be bridged by the built-in hosting runtime.
    #[error("stdio services can only be hosted on the built-in hosting runtime image")]
    StdioRequiresHostingRuntime,
}

/// Error returned while parsing an instance enum from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseInstanceValueError {
    /// Name of the value kind being parsed.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

impl ParseInstanceValueError {
    /// Creates a parse error for the given kind and input.
    #[must_use]
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
