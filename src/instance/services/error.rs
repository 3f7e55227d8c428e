//! Service-level errors for instance orchestration.

use crate::instance::{
    domain::{
        AccessType, EnvironmentId, EnvironmentType, InstanceDomainError, McpInstanceId,
        McpProtocol, ProxySynthesisError, ServerConfigError,
    },
    ports::{ContainerCoordinatorError, EnvironmentLookupError, InstanceRepositoryError},
};
use thiserror::Error;

/// Broad category of an orchestration failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceErrorKind {
    /// The request itself is invalid.
    Input,
    /// The request collides with existing state.
    Conflict,
    /// A referenced entity does not exist.
    NotFound,
    /// A collaborator failed.
    Dependency,
}

/// Service-level errors for instance orchestration.
#[derive(Debug, Error)]
pub enum InstanceServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] InstanceDomainError),

    /// The MCP server configuration is invalid.
    #[error(transparent)]
    Config(#[from] ServerConfigError),

    /// Target or public configuration could not be derived.
    #[error(transparent)]
    Synthesis(#[from] ProxySynthesisError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] InstanceRepositoryError),

    /// Environment lookup failed.
    #[error(transparent)]
    Environment(#[from] EnvironmentLookupError),

    /// Container coordinator operation failed.
    #[error(transparent)]
    Container(#[from] ContainerCoordinatorError),

    /// A required request field is absent.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Passthrough instances need an upstream URL.
    #[error("{0} instances require a url")]
    MissingUrl(AccessType),

    /// The configuration implies a different protocol than declared.
    #[error("declared protocol {declared} does not match configured protocol {inferred}")]
    ProtocolMismatch {
        /// Protocol named in the request.
        declared: McpProtocol,
        /// Protocol inferred from the configuration.
        inferred: McpProtocol,
    },

    /// The hosting environment does not exist.
    #[error("environment {0} not found")]
    EnvironmentNotFound(EnvironmentId),

    /// The hosting environment cannot run containers.
    #[error("environment {environment_id} is of type {environment_type}; hosting requires kubernetes")]
    UnsupportedEnvironment {
        /// Environment identifier.
        environment_id: EnvironmentId,
        /// Actual environment type.
        environment_type: EnvironmentType,
    },

    /// An edit asked for a different access mode.
    #[error("access type of MCP instance is {stored} and cannot be changed to {requested}")]
    AccessTypeImmutable {
        /// Stored access mode.
        stored: AccessType,
        /// Requested access mode.
        requested: AccessType,
    },

    /// Only hosted instances can be restarted.
    #[error("this service does not need to be restarted")]
    RestartNotSupported(AccessType),

    /// No instance exists with the given identifier.
    #[error("MCP instance {0} not found")]
    NotFound(McpInstanceId),
}

impl InstanceServiceError {
    /// Classifies the error for callers that map failures to responses.
    #[must_use]
    pub const fn kind(&self) -> InstanceErrorKind {
        match self {
            Self::Repository(
                InstanceRepositoryError::DuplicateInstance(_)
                | InstanceRepositoryError::DuplicateInstanceName(_),
            ) => InstanceErrorKind::Conflict,
            Self::Repository(InstanceRepositoryError::NotFound(_))
            | Self::Container(ContainerCoordinatorError::NotFound(_))
            | Self::EnvironmentNotFound(_)
            | Self::NotFound(_) => InstanceErrorKind::NotFound,
            Self::Repository(_) | Self::Environment(_) | Self::Container(_) => {
                InstanceErrorKind::Dependency
            }
            Self::Domain(_)
            | Self::Config(_)
            | Self::Synthesis(_)
            | Self::MissingField(_)
            | Self::MissingUrl(_)
            | Self::ProtocolMismatch { .. }
            | Self::UnsupportedEnvironment { .. }
            | Self::AccessTypeImmutable { .. }
            | Self::RestartNotSupported(_) => InstanceErrorKind::Input,
        }
    }
}

/// Result type for orchestration operations.
pub type InstanceServiceResult<T> = Result<T, InstanceServiceError>;

/// Failure of a best-effort enrichment step.
///
/// Enrichment failures never fail the enclosing operation; the enriched field
/// is left empty instead.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The environment source failed.
    #[error(transparent)]
    EnvironmentLookup(#[from] EnvironmentLookupError),

    /// The referenced environment no longer exists.
    #[error("environment {0} no longer exists")]
    EnvironmentMissing(EnvironmentId),
}
