use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockmaster_core::{DocumentId, StockKey};
use stockmaster_events::Event;

use crate::document::{DocumentStatus, DocumentType};
use crate::ledger::StockMovement;
use crate::product::Product;

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product: Product,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub key: StockKey,
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DocumentCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCreated {
    pub document: DocumentId,
    pub kind: DocumentType,
    pub status: DocumentStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DocumentStatusChanged (Waiting / Ready / Canceled edges).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatusChanged {
    pub document: DocumentId,
    pub from: DocumentStatus,
    pub to: DocumentStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DocumentValidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentValidated {
    pub document: DocumentId,
    pub kind: DocumentType,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockMoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMoved {
    pub movement: StockMovement,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    DocumentCreated(DocumentCreated),
    DocumentStatusChanged(DocumentStatusChanged),
    DocumentValidated(DocumentValidated),
    StockMoved(StockMoved),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ProductCreated(_) => "inventory.product.created",
            InventoryEvent::ProductUpdated(_) => "inventory.product.updated",
            InventoryEvent::DocumentCreated(_) => "inventory.document.created",
            InventoryEvent::DocumentStatusChanged(_) => "inventory.document.status_changed",
            InventoryEvent::DocumentValidated(_) => "inventory.document.validated",
            InventoryEvent::StockMoved(_) => "inventory.stock.moved",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ProductCreated(e) => e.occurred_at,
            InventoryEvent::ProductUpdated(e) => e.occurred_at,
            InventoryEvent::DocumentCreated(e) => e.occurred_at,
            InventoryEvent::DocumentStatusChanged(e) => e.occurred_at,
            InventoryEvent::DocumentValidated(e) => e.occurred_at,
            InventoryEvent::StockMoved(e) => e.occurred_at,
        }
    }
}
