//! Repository port for MCP instance persistence.

use crate::instance::domain::{InstanceName, McpInstance, McpInstanceId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for MCP instance repository operations.
pub type InstanceRepositoryResult<T> = Result<T, InstanceRepositoryError>;

/// Persistence contract for MCP instances.
#[async_trait]
pub trait McpInstanceRepository: Send + Sync {
    /// Stores a new instance.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceRepositoryError::DuplicateInstance`] when the ID
    /// already exists or [`InstanceRepositoryError::DuplicateInstanceName`]
    /// when the name is taken.
    async fn create(&self, instance: &McpInstance) -> InstanceRepositoryResult<()>;

    /// Persists updates to an existing instance.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceRepositoryError::NotFound`] when the instance does
    /// not exist or [`InstanceRepositoryError::DuplicateInstanceName`] when a
    /// rename collides with another instance.
    async fn update(&self, instance: &McpInstance) -> InstanceRepositoryResult<()>;

    /// Removes an instance.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceRepositoryError::NotFound`] when the instance does
    /// not exist.
    async fn delete(&self, instance_id: McpInstanceId) -> InstanceRepositoryResult<()>;

    /// Finds an instance by identifier.
    async fn find_by_id(
        &self,
        instance_id: McpInstanceId,
    ) -> InstanceRepositoryResult<Option<McpInstance>>;

    /// Finds an instance by unique name.
    async fn find_by_name(
        &self,
        name: &InstanceName,
    ) -> InstanceRepositoryResult<Option<McpInstance>>;

    /// Returns all instances ordered by creation time.
    async fn list_all(&self) -> InstanceRepositoryResult<Vec<McpInstance>>;
}

/// Errors returned by MCP instance repository implementations.
#[derive(Debug, Clone, Error)]
pub enum InstanceRepositoryError {
    /// An instance with the same identifier already exists.
    #[error("duplicate MCP instance identifier: {0}")]
    DuplicateInstance(McpInstanceId),

    /// An instance with the same name already exists.
    #[error("duplicate MCP instance name: {0}")]
    DuplicateInstanceName(InstanceName),

    /// The instance was not found.
    #[error("MCP instance not found: {0}")]
    NotFound(McpInstanceId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted MCP instance data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl InstanceRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
