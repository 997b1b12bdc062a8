//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Stock-keeping unit code (e.g. `PRD-001`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

/// Warehouse code (e.g. `WH-A`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WarehouseId(String);

macro_rules! impl_code_newtype {
    ($t:ident, $name:literal) => {
        impl $t {
            /// Build a code from user input. Surrounding whitespace is trimmed;
            /// an empty code is rejected.
            pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_input(concat!($name, " cannot be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_code_newtype!(Sku, "sku");
impl_code_newtype!(WarehouseId, "warehouse");

impl Default for WarehouseId {
    /// `WH-A`, the warehouse used when none is given.
    fn default() -> Self {
        Self("WH-A".to_string())
    }
}

/// Identity of one product row: a SKU stocked at one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub sku: Sku,
    pub warehouse: WarehouseId,
}

impl StockKey {
    pub fn new(sku: Sku, warehouse: WarehouseId) -> Self {
        Self { sku, warehouse }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.sku, self.warehouse)
    }
}

/// Letter prefix of a document id; one per movement type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentPrefix {
    /// `R`, receipts.
    Receipt,
    /// `D`, deliveries.
    Delivery,
    /// `T`, internal transfers.
    Transfer,
    /// `A`, adjustments.
    Adjustment,
}

impl DocumentPrefix {
    pub fn letter(self) -> char {
        match self {
            DocumentPrefix::Receipt => 'R',
            DocumentPrefix::Delivery => 'D',
            DocumentPrefix::Transfer => 'T',
            DocumentPrefix::Adjustment => 'A',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'R' => Some(DocumentPrefix::Receipt),
            'D' => Some(DocumentPrefix::Delivery),
            'T' => Some(DocumentPrefix::Transfer),
            'A' => Some(DocumentPrefix::Adjustment),
            _ => None,
        }
    }
}

/// Human-readable document id, `{PREFIX}-{seq:03}` (e.g. `R-001`, `T-1042`).
///
/// Ordering is by prefix, then numeric sequence, so `R-010 > R-009`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId {
    prefix: DocumentPrefix,
    seq: u32,
}

impl DocumentId {
    /// Sequence numbers start at 1.
    pub fn new(prefix: DocumentPrefix, seq: u32) -> Result<Self, DomainError> {
        if seq == 0 {
            return Err(DomainError::invalid_id("document sequence starts at 1"));
        }
        Ok(Self { prefix, seq })
    }

    /// First id for a prefix.
    pub fn first(prefix: DocumentPrefix) -> Self {
        Self { prefix, seq: 1 }
    }

    pub fn prefix(&self) -> DocumentPrefix {
        self.prefix
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// The id that follows this one within the same prefix.
    pub fn next(&self) -> Result<Self, DomainError> {
        let seq = self
            .seq
            .checked_add(1)
            .ok_or_else(|| DomainError::invalid_id("document sequence exhausted"))?;
        Ok(Self {
            prefix: self.prefix,
            seq,
        })
    }
}

impl core::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{:03}", self.prefix.letter(), self.seq)
    }
}

impl FromStr for DocumentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, tail) = s
            .split_once('-')
            .ok_or_else(|| DomainError::invalid_id(format!("DocumentId: missing '-' in {s:?}")))?;

        let mut letters = head.chars();
        let prefix = match (letters.next(), letters.next()) {
            (Some(c), None) => DocumentPrefix::from_letter(c),
            _ => None,
        }
        .ok_or_else(|| DomainError::invalid_id(format!("DocumentId: unknown prefix {head:?}")))?;

        if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_id(format!(
                "DocumentId: non-numeric sequence in {s:?}"
            )));
        }
        let seq = tail
            .parse::<u32>()
            .map_err(|e| DomainError::invalid_id(format!("DocumentId: {e}")))?;

        Self::new(prefix, seq)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.to_string()
    }
}

/// Identifier of the actor (user or system) performing an operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The well-known id used for operations without a signed-in user.
    pub fn system() -> Self {
        Self(Uuid::nil())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ActorId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("ActorId: {e}")))?;
        Ok(Self(uuid))
    }
}
