//! Infrastructure layer: persistence, the two stores, the ledger engine and
//! the facade that forms and pages call into.

pub mod backing;
pub mod config;
pub mod document_store;
pub mod error;
pub mod facade;
pub mod ledger;
pub mod persistence;
pub mod projections;
pub mod publisher;
pub mod seed;
pub mod stock_store;
pub mod summary;

pub use backing::Backing;
pub use config::LedgerConfig;
pub use document_store::{DocumentFilter, DocumentStore};
pub use error::LedgerError;
pub use facade::{LocalBus, StockMaster};
pub use ledger::LedgerEngine;
pub use persistence::{
    AnyPersistence, Collection, InMemoryPersistence, JsonFilePersistence, PersistenceError,
    PersistencePort,
};
pub use projections::{MoveFilter, MoveHistoryProjection, MoveRecord};
pub use publisher::{EventPublisher, InventoryEnvelope};
pub use stock_store::StockStore;
pub use summary::InventorySummary;
