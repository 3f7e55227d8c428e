//! Request payloads accepted by the instance orchestrator.

use crate::instance::domain::{AccessType, HostingSettings, McpInstanceId, McpProtocol};

/// Caller-supplied definition shared by create and edit requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDefinition {
    /// Instance name.
    pub name: String,
    /// Declared protocol.
    pub mcp_protocol: McpProtocol,
    /// Raw `mcpServers` JSON document.
    pub mcp_servers: Option<String>,
    /// Hosting settings, required for hosted instances.
    pub hosting: Option<HostingSettings>,
}

impl InstanceDefinition {
    /// Creates a definition with a name and declared protocol.
    #[must_use]
    pub fn new(name: impl Into<String>, mcp_protocol: McpProtocol) -> Self {
        Self {
            name: name.into(),
            mcp_protocol,
            mcp_servers: None,
            hosting: None,
        }
    }

    /// Attaches the raw `mcpServers` document.
    #[must_use]
    pub fn with_mcp_servers(mut self, mcp_servers: impl Into<String>) -> Self {
        self.mcp_servers = Some(mcp_servers.into());
        self
    }

    /// Attaches hosting settings.
    #[must_use]
    pub fn with_hosting(mut self, hosting: HostingSettings) -> Self {
        self.hosting = Some(hosting);
        self
    }

    /// Returns the raw document when it is present and not blank.
    pub(crate) fn raw_mcp_servers(&self) -> Option<&str> {
        self.mcp_servers
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
    }
}

/// Request to create an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInstanceRequest {
    /// Access mode of the new instance.
    pub access_type: AccessType,
    /// Instance definition.
    pub definition: InstanceDefinition,
}

impl CreateInstanceRequest {
    /// Creates a create request.
    #[must_use]
    pub const fn new(access_type: AccessType, definition: InstanceDefinition) -> Self {
        Self {
            access_type,
            definition,
        }
    }
}

/// Request to edit an existing instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditInstanceRequest {
    /// Instance to edit.
    pub instance_id: McpInstanceId,
    /// Access mode the caller believes the instance has.
    ///
    /// When present it must equal the stored access mode.
    pub access_type: Option<AccessType>,
    /// Replacement definition.
    pub definition: InstanceDefinition,
}

impl EditInstanceRequest {
    /// Creates an edit request.
    #[must_use]
    pub const fn new(instance_id: McpInstanceId, definition: InstanceDefinition) -> Self {
        Self {
            instance_id,
            access_type: None,
            definition,
        }
    }

    /// States the expected access mode.
    #[must_use]
    pub const fn with_access_type(mut self, access_type: AccessType) -> Self {
        self.access_type = Some(access_type);
        self
    }
}
