use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockmaster_core::ActorId;

/// Envelope for a published event, carrying audit + ordering metadata.
///
/// Notes:
/// - `sequence_number` is monotonically increasing per publisher, starting at 1.
/// - `actor` is who triggered the change (the system actor when anonymous).
/// - `payload` is the typed domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,

    /// Monotonically increasing position in the publisher's stream.
    sequence_number: u64,

    actor: ActorId,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(event_id: Uuid, sequence_number: u64, actor: ActorId, payload: E) -> Self {
        Self {
            event_id,
            sequence_number,
            actor,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
