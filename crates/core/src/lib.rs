//! `stockmaster-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model shared by every layer and the strongly-typed identifiers
//! that name stock rows and movement documents.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ActorId, DocumentId, DocumentPrefix, Sku, StockKey, WarehouseId};
