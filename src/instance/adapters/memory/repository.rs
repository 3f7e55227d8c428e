//! In-memory repository for MCP instances.

use crate::instance::{
    domain::{InstanceName, McpInstance, McpInstanceId},
    ports::{InstanceRepositoryError, InstanceRepositoryResult, McpInstanceRepository},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory MCP instance repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMcpInstanceRepository {
    state: Arc<RwLock<InMemoryInstanceState>>,
}

#[derive(Debug, Default)]
struct InMemoryInstanceState {
    instances: HashMap<McpInstanceId, McpInstance>,
    name_index: HashMap<InstanceName, McpInstanceId>,
}

impl InMemoryMcpInstanceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> InstanceRepositoryError {
    InstanceRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl McpInstanceRepository for InMemoryMcpInstanceRepository {
    async fn create(&self, instance: &McpInstance) -> InstanceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if state.instances.contains_key(&instance.id()) {
            return Err(InstanceRepositoryError::DuplicateInstance(instance.id()));
        }

        if state.name_index.contains_key(instance.name()) {
            return Err(InstanceRepositoryError::DuplicateInstanceName(
                instance.name().clone(),
            ));
        }

        state.name_index.insert(instance.name().clone(), instance.id());
        state.instances.insert(instance.id(), instance.clone());
        Ok(())
    }

    async fn update(&self, instance: &McpInstance) -> InstanceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        let stored_name = state
            .instances
            .get(&instance.id())
            .ok_or(InstanceRepositoryError::NotFound(instance.id()))?
            .name()
            .clone();

        if *instance.name() != stored_name {
            if let Some(&indexed_id) = state.name_index.get(instance.name())
                && indexed_id != instance.id()
            {
                return Err(InstanceRepositoryError::DuplicateInstanceName(
                    instance.name().clone(),
                ));
            }

            state.name_index.remove(&stored_name);
            state.name_index.insert(instance.name().clone(), instance.id());
        }

        state.instances.insert(instance.id(), instance.clone());
        Ok(())
    }

    async fn delete(&self, instance_id: McpInstanceId) -> InstanceRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let removed = state
            .instances
            .remove(&instance_id)
            .ok_or(InstanceRepositoryError::NotFound(instance_id))?;
        state.name_index.remove(removed.name());
        Ok(())
    }

    async fn find_by_id(
        &self,
        instance_id: McpInstanceId,
    ) -> InstanceRepositoryResult<Option<McpInstance>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.instances.get(&instance_id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &InstanceName,
    ) -> InstanceRepositoryResult<Option<McpInstance>> {
        let state = self.state.read().map_err(lock_error)?;
        let instance = state
            .name_index
            .get(name)
            .and_then(|id| state.instances.get(id))
            .cloned();
        Ok(instance)
    }

    async fn list_all(&self) -> InstanceRepositoryResult<Vec<McpInstance>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut instances: Vec<McpInstance> = state.instances.values().cloned().collect();
        instances.sort_by_key(|instance| (instance.created_at(), instance.id()));
        Ok(instances)
    }
}
