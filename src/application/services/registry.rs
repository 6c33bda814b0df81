use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::{ports::QueryEngine, DomainError};

/// Session-keyed map of query engine handles.
///
/// Follows a read-copy-update discipline: a rebuild constructs a complete new
/// engine outside the lock, then `swap` replaces the `Arc` under a short
/// write lock. Requests holding the old handle finish against the old engine.
pub struct EngineRegistry {
    engines: RwLock<HashMap<Uuid, Arc<dyn QueryEngine>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, session: Uuid) -> Result<Option<Arc<dyn QueryEngine>>, DomainError> {
        let engines = self
            .engines
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(engines.get(&session).cloned())
    }

    pub fn swap(&self, session: Uuid, engine: Arc<dyn QueryEngine>) -> Result<(), DomainError> {
        let mut engines = self
            .engines
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        engines.insert(session, engine);
        Ok(())
    }

    pub fn evict(&self, session: Uuid) -> Result<(), DomainError> {
        let mut engines = self
            .engines
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        engines.remove(&session);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), DomainError> {
        let mut engines = self
            .engines
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        engines.clear();
        Ok(())
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
