//! Port contracts for MCP instance orchestration.

mod container;
mod environment;
mod probe;
mod repository;

pub use container::{
    ContainerBuildRequest, ContainerCoordinator, ContainerCoordinatorError,
    ContainerCoordinatorResult, ContainerOperationOutcome, ContainerOptions,
};
#[cfg(test)]
pub use container::MockContainerCoordinator;
pub use environment::{EnvironmentDirectory, EnvironmentLookupError, EnvironmentLookupResult};
#[cfg(test)]
pub use probe::MockEndpointProbe;
pub use probe::{EndpointProbe, ProbeOutcome};
pub use repository::{InstanceRepositoryError, InstanceRepositoryResult, McpInstanceRepository};
