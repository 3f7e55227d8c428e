//! In-memory environment directory.

use crate::instance::{
    domain::{Environment, EnvironmentId},
    ports::{EnvironmentDirectory, EnvironmentLookupError, EnvironmentLookupResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory environment directory.
///
/// Lookups can be switched to fail to exercise degraded enrichment paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnvironmentDirectory {
    state: Arc<RwLock<InMemoryEnvironmentState>>,
}

#[derive(Debug, Default)]
struct InMemoryEnvironmentState {
    environments: HashMap<EnvironmentId, Environment>,
    unavailable: bool,
}

fn lock_error(err: impl ToString) -> EnvironmentLookupError {
    EnvironmentLookupError::unavailable(std::io::Error::other(err.to_string()))
}

impl InMemoryEnvironmentDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an environment.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentLookupError`] when lock acquisition fails.
    pub fn insert(&self, environment: Environment) -> EnvironmentLookupResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.environments.insert(environment.id(), environment);
        Ok(())
    }

    /// Makes every subsequent lookup fail (or succeed again).
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentLookupError`] when lock acquisition fails.
    pub fn set_unavailable(&self, unavailable: bool) -> EnvironmentLookupResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.unavailable = unavailable;
        Ok(())
    }
}

#[async_trait]
impl EnvironmentDirectory for InMemoryEnvironmentDirectory {
    async fn get(
        &self,
        environment_id: EnvironmentId,
    ) -> EnvironmentLookupResult<Option<Environment>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.unavailable {
            return Err(EnvironmentLookupError::unavailable(std::io::Error::other(
                "environment directory unavailable",
            )));
        }
        Ok(state.environments.get(&environment_id).cloned())
    }
}
