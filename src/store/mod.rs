//! Persistent queue store: entries, attempt history, error log.
//!
//! The store is the single source of truth for everything the tool knows
//! about its own activity. All timestamps are persisted as unix
//! milliseconds (UTC) so the store and the slot calculator share one clock.

pub mod backoff;
pub mod queue_store;
pub mod records;

pub use backoff::BackoffPolicy;
pub use queue_store::QueueStore;
pub use records::{ErrorRecord, ProcessingRecord, QueueEntry};

use crate::error::{PlanqError, Result};
use chrono::{DateTime, TimeZone, Utc};

/// Convert a UTC timestamp to the unix-millisecond form stored in SQLite.
pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Convert a stored unix-millisecond value back to a UTC timestamp.
pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(PlanqError::CorruptTimestamp(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_roundtrip() {
        let now = Utc::now();
        let restored = from_millis(to_millis(now)).unwrap();
        // Sub-millisecond precision is dropped by the store
        assert_eq!(restored.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_from_millis_rejects_out_of_range() {
        assert!(from_millis(i64::MAX).is_err());
    }
}
