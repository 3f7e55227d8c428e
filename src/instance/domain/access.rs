//! Access mode and wire protocol enumerations.

use super::ParseInstanceValueError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connectivity strategy of an instance.
///
/// Fixed at creation; every later operation on the instance is routed by the
/// stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// Clients connect straight to an externally running server.
    Direct,
    /// Clients connect through a stable platform proxy hop.
    Proxy,
    /// The platform runs the server as a container.
    Hosting,
}

impl AccessType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Proxy => "proxy",
            Self::Hosting => "hosting",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AccessType {
    type Error = ParseInstanceValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "direct" => Ok(Self::Direct),
            "proxy" => Ok(Self::Proxy),
            "hosting" => Ok(Self::Hosting),
            _ => Err(ParseInstanceValueError::new("access type", value)),
        }
    }
}

/// Wire protocol spoken by an MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpProtocol {
    /// Standard input/output of a local process.
    Stdio,
    /// HTTP with server-sent events.
    Sse,
    /// Streamable HTTP.
    StreamableHttp,
}

impl McpProtocol {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable_http",
        }
    }

    /// Returns the `type` value written into MCP client configuration
    /// documents.
    #[must_use]
    pub const fn config_name(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable-http",
        }
    }

    /// Parses a `type` or `transport` value from an MCP configuration
    /// document.
    ///
    /// Matching is case-insensitive and accepts the common spellings of
    /// streamable HTTP.
    #[must_use]
    pub fn from_config_name(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "stdio" => Some(Self::Stdio),
            "sse" => Some(Self::Sse),
            "streamable-http" | "streamable_http" | "streamablehttp" | "http" => {
                Some(Self::StreamableHttp)
            }
            _ => None,
        }
    }

    /// Returns the protocol exposed at the platform boundary.
    ///
    /// Stdio cannot cross a network hop, so it is bridged to SSE; the
    /// network protocols are exposed unchanged.
    #[must_use]
    pub const fn upgraded(self) -> Self {
        match self {
            Self::Stdio | Self::Sse => Self::Sse,
            Self::StreamableHttp => Self::StreamableHttp,
        }
    }

    /// Returns whether the protocol is network addressable.
    #[must_use]
    pub const fn is_network(self) -> bool {
        matches!(self, Self::Sse | Self::StreamableHttp)
    }
}

impl fmt::Display for McpProtocol {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for McpProtocol {
    type Error = ParseInstanceValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_config_name(value).ok_or_else(|| ParseInstanceValueError::new("MCP protocol", value))
    }
}
