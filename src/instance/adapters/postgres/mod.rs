//! `PostgreSQL` adapters for MCP instance persistence.

mod models;
mod repository;
mod schema;

pub use repository::{InstancePgPool, PostgresMcpInstanceRepository};
