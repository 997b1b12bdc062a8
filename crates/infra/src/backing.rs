//! Shared handle to one persistence port plus its single-writer gate.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::persistence::{Collection, PersistenceError, PersistencePort};

/// Guard held for the duration of one read-modify-write.
pub type WriteGuard<'a> = MutexGuard<'a, ()>;

/// A persistence port shared by the stock store, the document store and the
/// ledger engine.
///
/// Every mutation of either collection runs under the same writer gate, so
/// concurrent receipts and deliveries cannot interleave their
/// read-modify-write cycles and lose updates.
#[derive(Debug)]
pub struct Backing<P> {
    port: Arc<P>,
    writer: Arc<Mutex<()>>,
}

impl<P> Clone for Backing<P> {
    fn clone(&self) -> Self {
        Self {
            port: Arc::clone(&self.port),
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<P: PersistencePort> Backing<P> {
    pub fn new(port: P) -> Self {
        Self::from_arc(Arc::new(port))
    }

    pub fn from_arc(port: Arc<P>) -> Self {
        Self {
            port,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Whether two handles serialize their writes through the same gate.
    pub fn shares_writer_with(&self, other: &Backing<P>) -> bool {
        Arc::ptr_eq(&self.writer, &other.writer)
    }

    pub(crate) fn lock(&self) -> Result<WriteGuard<'_>, PersistenceError> {
        self.writer.lock().map_err(|_| PersistenceError::Poisoned)
    }

    pub(crate) fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, PersistenceError> {
        self.port
            .read(collection)?
            .into_iter()
            .map(|record| {
                serde_json::from_value(record).map_err(|source| PersistenceError::Serialization {
                    collection: collection.name(),
                    source,
                })
            })
            .collect()
    }
}

pub(crate) fn encode<T: Serialize>(collection: Collection, records: &[T]) -> Result<Vec<JsonValue>, PersistenceError> {
    records
        .iter()
        .map(|r| {
            serde_json::to_value(r).map_err(|source| PersistenceError::Serialization {
                collection: collection.name(),
                source,
            })
        })
        .collect()
}
