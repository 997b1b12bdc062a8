use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use super::{Collection, PersistenceError, PersistencePort};

/// In-memory persistence.
///
/// Intended for tests and throwaway sessions. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    collections: RwLock<HashMap<Collection, Vec<JsonValue>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistencePort for InMemoryPersistence {
    fn read(&self, collection: Collection) -> Result<Vec<JsonValue>, PersistenceError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| PersistenceError::Poisoned)?;

        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    fn commit(&self, batch: Vec<(Collection, Vec<JsonValue>)>) -> Result<(), PersistenceError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| PersistenceError::Poisoned)?;

        // Single write lock: readers observe the whole batch or none of it.
        for (collection, records) in batch {
            collections.insert(collection, records);
        }
        Ok(())
    }
}
