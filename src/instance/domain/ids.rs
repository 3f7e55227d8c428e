//! Identifier and validated-name types for MCP instances.

use super::InstanceDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length for an instance name, matching `VARCHAR(100)`.
const MAX_INSTANCE_NAME_LENGTH: usize = 100;

/// Unique identifier for an MCP instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct McpInstanceId(Uuid);

impl McpInstanceId {
    /// Creates a new random instance identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an instance identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for McpInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for McpInstanceId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for McpInstanceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, human-readable instance name.
///
/// Names are unique across instances; uniqueness is enforced by the
/// repository rather than checked here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceName(String);

impl InstanceName {
    /// Creates a validated instance name.
    ///
    /// The input is trimmed; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceDomainError`] when the name is empty or too long.
    pub fn new(value: impl Into<String>) -> Result<Self, InstanceDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(InstanceDomainError::EmptyInstanceName);
        }

        if normalized.chars().count() > MAX_INSTANCE_NAME_LENGTH {
            return Err(InstanceDomainError::InstanceNameTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the instance name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Identifier of a deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentId(i64);

impl EnvironmentId {
    /// Creates a validated environment identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceDomainError::InvalidEnvironmentId`] unless the value
    /// is strictly positive.
    pub const fn new(value: i64) -> Result<Self, InstanceDomainError> {
        if value <= 0 {
            return Err(InstanceDomainError::InvalidEnvironmentId(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("weather", "weather")]
    #[case("  Weather Service  ", "Weather Service")]
    fn instance_name_is_trimmed(#[case] input: &str, #[case] expected: &str) {
        let name = InstanceName::new(input).expect("valid instance name");
        assert_eq!(name.as_str(), expected);
    }

    #[test]
    fn instance_name_rejects_blank_input() {
        assert_eq!(
            InstanceName::new("   "),
            Err(InstanceDomainError::EmptyInstanceName)
        );
    }

    #[test]
    fn instance_name_rejects_overlong_input() {
        let result = InstanceName::new("n".repeat(101));
        assert!(matches!(
            result,
            Err(InstanceDomainError::InstanceNameTooLong(_))
        ));
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    fn environment_id_must_be_positive(#[case] value: i64) {
        assert_eq!(
            EnvironmentId::new(value),
            Err(InstanceDomainError::InvalidEnvironmentId(value))
        );
    }
}
