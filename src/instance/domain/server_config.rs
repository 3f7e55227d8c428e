//! MCP server configuration validation.
//!
//! Operators submit configuration in the shape MCP clients use:
//!
//! ```json
//! { "mcpServers": { "weather": { "type": "sse", "url": "http://host/sse" } } }
//! ```
//!
//! Validation checks the document structure, infers the wire protocol, and
//! decodes the single service entry into a typed [`ServerEndpoint`] so later
//! stages never re-parse the raw JSON.

use super::{McpProtocol, ServerConfigError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const MCP_SERVERS_KEY: &str = "mcpServers";

/// Which optional fields were present on the service entry.
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag mirrors one optional configuration field"
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentFields {
    /// `args` was present.
    pub has_args: bool,
    /// `command` was present.
    pub has_command: bool,
    /// `type` was present.
    pub has_type: bool,
    /// `transport` was present.
    pub has_transport: bool,
    /// `url` was present.
    pub has_url: bool,
}

impl PresentFields {
    fn inspect(entry: &Map<String, Value>) -> Self {
        let present = |key: &str| entry.get(key).is_some_and(|value| !value.is_null());
        Self {
            has_args: present("args"),
            has_command: present("command"),
            has_type: present("type"),
            has_transport: present("transport"),
            has_url: present("url"),
        }
    }
}

/// Decoded stdio server launch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioServerConfig {
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl StdioServerConfig {
    /// Returns the executable command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns command-line arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns process environment variables.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Returns the command followed by its arguments, space separated.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Decoded network server endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkServerConfig {
    url: String,
    headers: BTreeMap<String, String>,
}

impl NetworkServerConfig {
    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns request headers sent to the endpoint.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Typed form of a validated service entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "config")]
pub enum ServerEndpoint {
    /// Server launched as a local process.
    Stdio(StdioServerConfig),
    /// Server reachable over the network.
    Network(NetworkServerConfig),
}

/// Outcome of a successful configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedServerConfig {
    service_name: String,
    protocol: McpProtocol,
    fields: PresentFields,
    endpoint: ServerEndpoint,
    document: Value,
}

impl ValidatedServerConfig {
    /// Returns the single service name under `mcpServers`.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the inferred protocol.
    #[must_use]
    pub const fn protocol(&self) -> McpProtocol {
        self.protocol
    }

    /// Returns which optional fields were present.
    #[must_use]
    pub const fn fields(&self) -> PresentFields {
        self.fields
    }

    /// Returns the decoded endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Returns the endpoint URL for network services.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.endpoint {
            ServerEndpoint::Network(network) => Some(network.url()),
            ServerEndpoint::Stdio(_) => None,
        }
    }

    /// Returns the stdio launch settings for stdio services.
    #[must_use]
    pub const fn stdio(&self) -> Option<&StdioServerConfig> {
        match &self.endpoint {
            ServerEndpoint::Stdio(stdio) => Some(stdio),
            ServerEndpoint::Network(_) => None,
        }
    }

    /// Returns the original document.
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.document
    }

    /// Consumes the result and returns the original document.
    #[must_use]
    pub fn into_document(self) -> Value {
        self.document
    }
}

/// Validates a raw JSON configuration payload.
///
/// # Errors
///
/// Returns [`ServerConfigError::InvalidJson`] when the payload does not parse
/// and the errors of [`validate_server_document`] otherwise.
pub fn validate_server_config(raw: &str) -> Result<ValidatedServerConfig, ServerConfigError> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|err| ServerConfigError::InvalidJson(err.to_string()))?;
    validate_server_document(document)
}

/// Validates an already parsed configuration document.
///
/// Rules are applied in order and the first violation is returned:
/// `mcpServers` must exist and hold exactly one service, the service name
/// must be well formed, a supported protocol must be inferable, and the
/// protocol's required field must be non-empty.
///
/// # Errors
///
/// Returns the [`ServerConfigError`] of the first violated rule.
pub fn validate_server_document(document: Value) -> Result<ValidatedServerConfig, ServerConfigError> {
    let servers = document
        .get(MCP_SERVERS_KEY)
        .ok_or(ServerConfigError::MissingMcpServers)?
        .as_object()
        .ok_or(ServerConfigError::McpServersNotObject)?;

    if servers.len() != 1 {
        return Err(ServerConfigError::ServiceCount {
            found: servers.len(),
        });
    }
    let Some((name, entry_value)) = servers.iter().next() else {
        return Err(ServerConfigError::ServiceCount { found: 0 });
    };

    validate_service_name(name)?;
    let entry = entry_value
        .as_object()
        .ok_or_else(|| ServerConfigError::ServiceEntryNotObject(name.clone()))?;

    let fields = PresentFields::inspect(entry);
    let protocol = infer_protocol(name, entry)?;
    let endpoint = decode_endpoint(protocol, entry)?;
    let service_name = name.clone();

    Ok(ValidatedServerConfig {
        service_name,
        protocol,
        fields,
        endpoint,
        document,
    })
}

fn validate_service_name(name: &str) -> Result<(), ServerConfigError> {
    let mut characters = name.chars();
    let Some(first) = characters.next() else {
        return Err(ServerConfigError::InvalidServiceName(name.to_owned()));
    };

    let is_word = |character: char| character.is_ascii_alphanumeric() || matches!(character, '_' | '-');
    let first_ok = is_word(first) && !first.is_ascii_digit();
    if !first_ok || !characters.all(is_word) {
        return Err(ServerConfigError::InvalidServiceName(name.to_owned()));
    }
    Ok(())
}

fn infer_protocol(
    service_name: &str,
    entry: &Map<String, Value>,
) -> Result<McpProtocol, ServerConfigError> {
    for key in ["type", "transport"] {
        if let Some(declared) = non_empty(string_field(entry, key)?) {
            return McpProtocol::from_config_name(declared)
                .ok_or_else(|| ServerConfigError::UnsupportedProtocol(declared.to_owned()));
        }
    }

    if let Some(url) = non_empty(string_field(entry, "url")?) {
        return Ok(if url.contains("sse") {
            McpProtocol::Sse
        } else {
            McpProtocol::StreamableHttp
        });
    }

    if non_empty(string_field(entry, "command")?).is_some() {
        return Ok(McpProtocol::Stdio);
    }

    Err(ServerConfigError::UndeterminedProtocol(service_name.to_owned()))
}

fn decode_endpoint(
    protocol: McpProtocol,
    entry: &Map<String, Value>,
) -> Result<ServerEndpoint, ServerConfigError> {
    match protocol {
        McpProtocol::Stdio => {
            let command = non_empty(string_field(entry, "command")?)
                .ok_or(ServerConfigError::MissingCommand)?;
            Ok(ServerEndpoint::Stdio(StdioServerConfig {
                command: command.to_owned(),
                args: string_list_field(entry, "args")?,
                env: string_map_field(entry, "env")?,
            }))
        }
        McpProtocol::Sse | McpProtocol::StreamableHttp => {
            let url = non_empty(string_field(entry, "url")?)
                .ok_or(ServerConfigError::MissingUrl { protocol })?;
            Ok(ServerEndpoint::Network(NetworkServerConfig {
                url: url.to_owned(),
                headers: string_map_field(entry, "headers")?,
            }))
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

fn string_field<'a>(
    entry: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, ServerConfigError> {
    match entry.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(ServerConfigError::InvalidField {
            field,
            reason: "must be a string",
        }),
    }
}

fn string_list_field(
    entry: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ServerConfigError> {
    let invalid = ServerConfigError::InvalidField {
        field,
        reason: "must be an array of strings",
    };
    match entry.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned).ok_or_else(|| invalid.clone()))
            .collect(),
        Some(_) => Err(invalid),
    }
}

fn string_map_field(
    entry: &Map<String, Value>,
    field: &'static str,
) -> Result<BTreeMap<String, String>, ServerConfigError> {
    let invalid = ServerConfigError::InvalidField {
        field,
        reason: "must be an object of string values",
    };
    match entry.get(field) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(values)) => values
            .iter()
            .map(|(key, value)| {
                value
                    .as_str()
                    .map(|text| (key.clone(), text.to_owned()))
                    .ok_or_else(|| invalid.clone())
            })
            .collect(),
        Some(_) => Err(invalid),
    }
}
