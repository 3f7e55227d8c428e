//! mcp-conductor: management plane core for MCP service instances.
//!
//! This crate validates MCP server configuration payloads, derives the
//! target and public proxy configuration for each access mode, drives the
//! container lifecycle of hosted instances, and reports live instance
//! health.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, runtime, network)
//!
//! # Modules
//!
//! - [`config`]: Orchestrator settings
//! - [`instance`]: Instance access-mode orchestration

pub mod config;
pub mod instance;
