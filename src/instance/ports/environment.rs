//! Read-only lookup of deployment environments.

use crate::instance::domain::{Environment, EnvironmentId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for environment lookups.
pub type EnvironmentLookupResult<T> = Result<T, EnvironmentLookupError>;

/// Source of deployment environments owned by another subsystem.
#[async_trait]
pub trait EnvironmentDirectory: Send + Sync {
    /// Returns the environment with the given identifier, if it exists.
    async fn get(&self, environment_id: EnvironmentId)
    -> EnvironmentLookupResult<Option<Environment>>;
}

/// Errors returned by environment directory implementations.
#[derive(Debug, Clone, Error)]
pub enum EnvironmentLookupError {
    /// The environment source could not be reached.
    #[error("environment lookup failed: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl EnvironmentLookupError {
    /// Wraps a lookup failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
