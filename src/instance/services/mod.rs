//! Application services for MCP instance orchestration.

mod error;
mod orchestrator;
mod requests;
mod status;
pub mod strategy;

pub use error::{EnrichmentError, InstanceErrorKind, InstanceServiceError, InstanceServiceResult};
pub use orchestrator::{InstanceDescription, InstanceOrchestrator};
pub use requests::{CreateInstanceRequest, EditInstanceRequest, InstanceDefinition};
pub use status::{HealthProbe, InstanceHealthReport, StatusProbe};
