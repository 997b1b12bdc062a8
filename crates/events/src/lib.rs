//! Domain events and the in-process bus that distributes them.
//!
//! Events are published only after the state they describe has been
//! committed; the bus is for distribution, never for storage.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
