//! Error returned by every store and ledger operation.

use thiserror::Error;

use stockmaster_core::DomainError;

use crate::persistence::PersistenceError;

/// Either a rejected operation (domain) or a storage failure (persistence).
///
/// In both cases nothing was committed.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl LedgerError {
    /// The domain error, if this is a rejected operation.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            LedgerError::Persistence(_) => None,
        }
    }
}
