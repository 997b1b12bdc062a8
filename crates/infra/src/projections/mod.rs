//! Read models built from published inventory events.
//!
//! Projections are disposable, rebuildable from the event stream, and
//! idempotent under at-least-once delivery.

pub mod move_history;

pub use move_history::{MoveFilter, MoveHistoryError, MoveHistoryProjection, MoveRecord};
