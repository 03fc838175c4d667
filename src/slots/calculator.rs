//! Infers available planning slots from attempt history and the external
//! activity signal.
//!
//! The calculator holds no state of its own: a snapshot is a pure function
//! of the store's contents, the probe's answer, and the `now` it is given.
//! Store read failures are fatal to the snapshot; probe failures degrade to
//! zero external activity, which may undercount contention but never
//! overcounts it.

use crate::error::Result;
use crate::probe::ActivityProbe;
use crate::slots::SlotStatus;
use crate::store::QueueStore;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Slots granted by the upstream service
pub const TOTAL_SLOTS: u32 = 15;

/// Minutes after which a consumed slot is presumed free again
pub const SLOT_RECHARGE_MINUTES: i64 = 30;

/// Capacity estimator for the shared planning service.
pub struct SlotCalculator {
    store: Arc<QueueStore>,
    probe: Arc<dyn ActivityProbe>,
    total_slots: u32,
    recharge_minutes: i64,
}

impl SlotCalculator {
    /// Create a calculator with the default slot constants.
    pub fn new(store: Arc<QueueStore>, probe: Arc<dyn ActivityProbe>) -> Self {
        Self::with_limits(store, probe, TOTAL_SLOTS, SLOT_RECHARGE_MINUTES)
    }

    /// Create a calculator with explicit limits (from config).
    pub fn with_limits(
        store: Arc<QueueStore>,
        probe: Arc<dyn ActivityProbe>,
        total_slots: u32,
        recharge_minutes: i64,
    ) -> Self {
        Self {
            store,
            probe,
            total_slots,
            recharge_minutes,
        }
    }

    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    /// Estimate current capacity.
    ///
    /// 1. Every own attempt inside the recharge window consumes one slot,
    ///    successful or not, capped at the total.
    /// 2. The probe's signal covers all activity on the shared service,
    ///    ours included; subtracting our attempt count leaves the external
    ///    share. A failed probe contributes zero.
    /// 3. Available = total - consumed, clamped at zero. External activity
    ///    is not capped before the clamp, so `consumed_slots` can report
    ///    more than the total under heavy outside load.
    /// 4. When nothing is available and one of our own attempts is in the
    ///    window, the next slot recharges one window after the oldest such
    ///    attempt. With only external consumption there is no basis to
    ///    predict recharge, and the estimate says so by leaving it unset.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Result<SlotStatus> {
        let window = Duration::minutes(self.recharge_minutes);
        let own = self.store.recent_attempts(self.recharge_minutes, now)?;

        let own_consumed = (own.len() as u64).min(u64::from(self.total_slots)) as u32;
        let external_net = self.external_net(now - window, own.len() as u64).await;

        let consumed = u64::from(own_consumed) + external_net;
        let available = u64::from(self.total_slots).saturating_sub(consumed) as u32;

        let next_slot_available_at = if available == 0 {
            // recent_attempts returns oldest first
            own.first().map(|oldest| oldest.recorded_at + window)
        } else {
            None
        };

        Ok(SlotStatus {
            total_slots: self.total_slots,
            consumed_slots: consumed.min(u64::from(u32::MAX)) as u32,
            available_slots: available,
            next_slot_available_at,
        })
    }

    /// How many items can be dispatched right now.
    pub async fn window_size(&self, now: DateTime<Utc>) -> Result<u32> {
        Ok(self.snapshot(now).await?.available_slots)
    }

    /// External activity net of our own attempts. Probe faults degrade to
    /// zero rather than propagating into the capacity computation.
    async fn external_net(&self, since: DateTime<Utc>, own_attempts: u64) -> u64 {
        match self.probe.external_activity(since).await {
            Ok(total) => total.saturating_sub(own_attempts),
            Err(e) => {
                log::warn!("Activity probe failed, assuming no external activity: {}", e);
                0
            }
        }
    }
}
