//! Publication of committed inventory events.

use std::sync::Mutex;

use uuid::Uuid;

use stockmaster_core::ActorId;
use stockmaster_events::{Event, EventBus, EventEnvelope, Subscription};
use stockmaster_inventory::InventoryEvent;

pub type InventoryEnvelope = EventEnvelope<InventoryEvent>;

/// Wraps events in envelopes with a gap-free sequence and hands them to the bus.
///
/// Publication always happens after the state change is committed. A bus
/// failure is logged and swallowed: the write already happened, only the
/// notification is lost. The sequence only advances on a successful publish.
#[derive(Debug)]
pub struct EventPublisher<B> {
    bus: B,
    sequence: Mutex<u64>,
}

impl<B> EventPublisher<B>
where
    B: EventBus<InventoryEnvelope>,
{
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            sequence: Mutex::new(0),
        }
    }

    pub fn subscribe(&self) -> Subscription<InventoryEnvelope> {
        self.bus.subscribe()
    }

    /// Publish events in order; returns how many reached the bus.
    pub fn publish(&self, actor: ActorId, events: Vec<InventoryEvent>) -> usize {
        let mut sequence = match self.sequence.lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!(count = events.len(), "event sequence lock poisoned; events not published");
                return 0;
            }
        };

        let mut published = 0;
        for event in events {
            let next = *sequence + 1;
            let event_type = event.event_type();
            let envelope = EventEnvelope::new(Uuid::now_v7(), next, actor, event);
            match self.bus.publish(envelope) {
                Ok(()) => {
                    *sequence = next;
                    tracing::debug!(sequence = next, event_type, "event published");
                    published += 1;
                }
                // The number is reused by the next event so subscribers never see a gap.
                Err(err) => {
                    tracing::warn!(sequence = next, event_type, "failed to publish inventory event: {err:?}");
                }
            }
        }
        published
    }
}
