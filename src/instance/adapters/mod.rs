//! Adapter implementations for MCP instance orchestration ports.

pub mod memory;
pub mod postgres;

mod probe;
mod runtime;

pub use probe::TcpEndpointProbe;
pub use runtime::{CoordinatorOperation, InMemoryContainerCoordinator};
