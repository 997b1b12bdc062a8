use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockmaster_core::{ActorId, DocumentId, Sku, WarehouseId};
use stockmaster_events::Subscription;
use stockmaster_inventory::{DocumentType, InventoryEvent};

use crate::publisher::InventoryEnvelope;

/// One row of the move history: a single stock effect of a validated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub sequence: u64,
    pub document: DocumentId,
    pub kind: DocumentType,
    pub sku: Sku,
    pub from: Option<WarehouseId>,
    pub to: Option<WarehouseId>,
    pub quantity: u64,
    pub actor: ActorId,
    pub occurred_at: DateTime<Utc>,
}

impl MoveRecord {
    /// Whether the move left or reached `warehouse`.
    pub fn touches(&self, warehouse: &WarehouseId) -> bool {
        self.from.as_ref() == Some(warehouse) || self.to.as_ref() == Some(warehouse)
    }
}

/// Criteria for [`MoveHistoryProjection::list_filtered`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveFilter {
    pub sku: Option<Sku>,
    pub warehouse: Option<WarehouseId>,
}

impl MoveFilter {
    pub fn matches(&self, record: &MoveRecord) -> bool {
        self.sku.as_ref().is_none_or(|s| &record.sku == s)
            && self.warehouse.as_ref().is_none_or(|w| record.touches(w))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveHistoryError {
    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },

    #[error("move history lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct State {
    cursor: u64,
    moves: Vec<MoveRecord>,
}

/// Move history read model.
///
/// Consumes published envelopes and keeps every `StockMoved` as a
/// [`MoveRecord`]. Disposable: rebuild it by replaying the event stream.
#[derive(Debug, Default)]
pub struct MoveHistoryProjection {
    state: RwLock<State>,
}

impl MoveHistoryProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one envelope.
    ///
    /// - Replays at or below the cursor are ignored (at-least-once delivery)
    /// - After the first envelope, sequences must advance by exactly one
    /// - Events other than `StockMoved` only advance the cursor
    pub fn apply_envelope(&self, envelope: &InventoryEnvelope) -> Result<(), MoveHistoryError> {
        let mut state = self.state.write().map_err(|_| MoveHistoryError::Poisoned)?;
        let last = state.cursor;
        let seq = envelope.sequence_number();

        if seq == 0 {
            return Err(MoveHistoryError::NonMonotonicSequence { last, found: seq });
        }
        if seq <= last {
            return Ok(());
        }
        if last != 0 && seq != last + 1 {
            return Err(MoveHistoryError::NonMonotonicSequence { last, found: seq });
        }

        if let InventoryEvent::StockMoved(moved) = envelope.payload() {
            let m = &moved.movement;
            state.moves.push(MoveRecord {
                sequence: seq,
                document: m.document,
                kind: m.kind,
                sku: m.sku.clone(),
                from: m.from.clone(),
                to: m.to.clone(),
                quantity: m.quantity,
                actor: envelope.actor(),
                occurred_at: moved.occurred_at,
            });
        }

        state.cursor = seq;
        Ok(())
    }

    /// Apply everything already queued on `subscription`; returns how many
    /// envelopes were read.
    pub fn catch_up(&self, subscription: &Subscription<InventoryEnvelope>) -> Result<usize, MoveHistoryError> {
        let envelopes = subscription.drain();
        for envelope in &envelopes {
            self.apply_envelope(envelope)?;
        }
        Ok(envelopes.len())
    }

    /// Last applied sequence number (0 before any).
    pub fn cursor(&self) -> u64 {
        self.state.read().map(|s| s.cursor).unwrap_or(0)
    }

    /// All moves, newest first.
    pub fn list(&self) -> Vec<MoveRecord> {
        self.list_filtered(&MoveFilter::default())
    }

    pub fn list_filtered(&self, filter: &MoveFilter) -> Vec<MoveRecord> {
        match self.state.read() {
            Ok(state) => state
                .moves
                .iter()
                .rev()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
