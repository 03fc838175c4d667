//! Slot accounting for the shared planning service.
//!
//! The upstream service grants a fixed number of processing slots that
//! recharge a fixed interval after use. Neither the limit algorithm nor
//! other callers' activity is directly observable, so capacity is inferred
//! from our own attempt history plus a best-effort external signal.

pub mod calculator;

pub use calculator::SlotCalculator;

use chrono::{DateTime, Utc};

/// A point-in-time capacity estimate. Derived, never persisted.
///
/// Construct once, never mutate. `next_slot_available_at` is present iff
/// no slots are available and at least one of our own attempts anchors the
/// recharge prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotStatus {
    pub total_slots: u32,
    pub consumed_slots: u32,
    pub available_slots: u32,
    pub next_slot_available_at: Option<DateTime<Utc>>,
}

impl SlotStatus {
    /// Whether at least one slot is free.
    pub fn has_capacity(&self) -> bool {
        self.available_slots > 0
    }
}
