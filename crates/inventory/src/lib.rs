//! Inventory domain module: products, movement documents and the ledger
//! rules that turn a validated document into stock changes.
//!
//! Everything here is deterministic domain logic (no IO, no clocks, no
//! storage, no logging). Callers supply timestamps and persist results.

pub mod document;
pub mod event;
pub mod ledger;
pub mod product;
pub mod stock;

pub use document::{
    CountLine, Document, DocumentBody, DocumentStatus, DocumentType, MAX_LINE_QTY, MoveLine,
    NewDocument,
};
pub use event::{
    DocumentCreated, DocumentStatusChanged, DocumentValidated, InventoryEvent, ProductCreated,
    ProductUpdated, StockMoved,
};
pub use ledger::{StockMovement, ValidationPlan, plan_validation};
pub use product::{NewProduct, Product, ProductDefaults, ProductPatch, StockStatus, coerce_quantity};
pub use stock::{PatchReport, StockSnapshot};
