//! Diesel row models for MCP instance persistence.

use super::schema::mcp_instances;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for MCP instance records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mcp_instances)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct McpInstanceRow {
    /// Instance identifier.
    pub id: uuid::Uuid,
    /// Unique instance name.
    pub name: String,
    /// Access mode.
    pub access_type: String,
    /// Declared protocol.
    pub mcp_protocol: String,
    /// Configuration as submitted.
    pub source_config: Value,
    /// Derived routing configuration.
    pub target_config: Value,
    /// Derived client-facing configuration.
    pub public_proxy_config: Value,
    /// Enabled state.
    pub status: String,
    /// Hosting settings and container state.
    pub hosting: Option<Value>,
    /// Latest explanatory status message.
    pub status_message: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for MCP instance records.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = mcp_instances)]
#[diesel(treat_none_as_null = true)]
pub struct NewMcpInstanceRow {
    /// Instance identifier.
    pub id: uuid::Uuid,
    /// Unique instance name.
    pub name: String,
    /// Access mode.
    pub access_type: String,
    /// Declared protocol.
    pub mcp_protocol: String,
    /// Configuration as submitted.
    pub source_config: Value,
    /// Derived routing configuration.
    pub target_config: Value,
    /// Derived client-facing configuration.
    pub public_proxy_config: Value,
    /// Enabled state.
    pub status: String,
    /// Hosting settings and container state.
    pub hosting: Option<Value>,
    /// Latest explanatory status message.
    pub status_message: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
