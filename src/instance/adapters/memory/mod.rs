//! In-memory adapters for instance persistence and environment lookup.

mod environment;
mod repository;

pub use environment::InMemoryEnvironmentDirectory;
pub use repository::InMemoryMcpInstanceRepository;
