//! MCP instance access-mode orchestration.
//!
//! An instance is an MCP server made reachable through the platform in one
//! of three access modes: `direct` passthrough, platform `proxy`, or a
//! `hosting` container deployed into a Kubernetes environment. This module
//! validates server configuration payloads, synthesizes target and public
//! proxy configurations, drives hosted container lifecycle, and reports
//! instance health. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
