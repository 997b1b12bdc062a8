//! Persistence port: durable storage for the two logical collections.
//!
//! The port deals in JSON records and knows nothing about products or
//! documents; the stores own (de)serialization. A backend only has to
//! guarantee that one `commit` lands entirely or not at all.

pub mod in_memory;
pub mod json_file;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

pub use in_memory::InMemoryPersistence;
pub use json_file::JsonFilePersistence;

/// Logical collection name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Products,
    Documents,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Products, Collection::Documents];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Documents => "documents",
        }
    }
}

/// Storage failure.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize {collection}: {source}")]
    Serialization {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt store: {0}")]
    Corrupt(String),

    #[error("lock poisoned")]
    Poisoned,
}

/// Record-level storage for products and documents.
///
/// Implementations must:
/// - return records in the order they were written
/// - apply a `commit` batch atomically (every collection or none)
/// - be safe to share across threads
pub trait PersistencePort: Send + Sync {
    /// All records of a collection; empty when nothing was ever written.
    fn read(&self, collection: Collection) -> Result<Vec<JsonValue>, PersistenceError>;

    /// Replace several collections in one atomic step.
    fn commit(&self, batch: Vec<(Collection, Vec<JsonValue>)>) -> Result<(), PersistenceError>;

    /// Replace one collection.
    fn write(&self, collection: Collection, records: Vec<JsonValue>) -> Result<(), PersistenceError> {
        self.commit(vec![(collection, records)])
    }
}

impl<S> PersistencePort for Arc<S>
where
    S: PersistencePort + ?Sized,
{
    fn read(&self, collection: Collection) -> Result<Vec<JsonValue>, PersistenceError> {
        (**self).read(collection)
    }

    fn commit(&self, batch: Vec<(Collection, Vec<JsonValue>)>) -> Result<(), PersistenceError> {
        (**self).commit(batch)
    }

    fn write(&self, collection: Collection, records: Vec<JsonValue>) -> Result<(), PersistenceError> {
        (**self).write(collection, records)
    }
}

/// Either built-in backend, chosen at runtime from configuration.
#[derive(Debug)]
pub enum AnyPersistence {
    Memory(InMemoryPersistence),
    File(JsonFilePersistence),
}

impl PersistencePort for AnyPersistence {
    fn read(&self, collection: Collection) -> Result<Vec<JsonValue>, PersistenceError> {
        match self {
            AnyPersistence::Memory(p) => p.read(collection),
            AnyPersistence::File(p) => p.read(collection),
        }
    }

    fn commit(&self, batch: Vec<(Collection, Vec<JsonValue>)>) -> Result<(), PersistenceError> {
        match self {
            AnyPersistence::Memory(p) => p.commit(batch),
            AnyPersistence::File(p) => p.commit(batch),
        }
    }
}
