//! Unit tests for the instance module.
//!
//! Orchestrator tests run against the in-memory adapters; status tests use
//! mocked collaborators to pin down which collaborator each access type may
//! touch.

mod status_tests;
