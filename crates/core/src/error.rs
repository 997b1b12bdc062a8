//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a rejected operation: the caller gets the error back and
/// no stock or document state has changed. Storage failures belong to the
/// infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A product with this SKU already exists (in any warehouse).
    #[error("duplicate sku: {0}")]
    DuplicateSku(String),

    /// A product row or document does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Applying a decrease would take the row below zero.
    #[error(
        "insufficient stock for {sku} in {warehouse} (available {available}, requested {requested})"
    )]
    InsufficientStock {
        sku: String,
        warehouse: String,
        available: u64,
        requested: u64,
    },

    /// An internal transfer has no destination warehouse.
    #[error("internal transfer {0} has no destination warehouse")]
    MissingDestination(String),

    /// Input failed validation (empty required text, bad quantity, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The document status machine has no such edge.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn duplicate_sku(sku: impl Into<String>) -> Self {
        Self::DuplicateSku(sku.into())
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn missing_destination(document: impl Into<String>) -> Self {
        Self::MissingDestination(document.into())
    }

    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Stable machine-readable kind, for callers that map errors to UI messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::DuplicateSku(_) => "duplicate_sku",
            DomainError::NotFound { .. } => "not_found",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::MissingDestination(_) => "missing_destination",
            DomainError::InvalidInput(_) => "invalid_input",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::InvalidId(_) => "invalid_id",
        }
    }
}
