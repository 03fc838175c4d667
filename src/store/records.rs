//! Record types persisted by the queue store.
//!
//! Three kinds of record back the queue: `QueueEntry` rows (mutable, one per
//! work item), `ProcessingRecord` facts (append-only attempt history) and
//! `ErrorRecord` facts (append-only diagnostics log).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A queued work item awaiting a planning attempt.
///
/// Identity is the (repo, issue_number) pair; the store enforces uniqueness
/// on it. `next_retry_at` gates eligibility for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEntry {
    /// Repository identifier, "owner/repo"
    pub repo: String,

    /// Work item number within the repository
    pub issue_number: u64,

    /// When this entry becomes eligible for dispatch again
    pub next_retry_at: DateTime<Utc>,

    /// Failed attempts so far
    pub retry_count: u32,

    /// Message from the most recent failure, if any
    pub last_error: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl QueueEntry {
    /// Display key used in logs and error contexts: "owner/repo#123".
    pub fn key(&self) -> String {
        format!("{}#{}", self.repo, self.issue_number)
    }

    /// Whether this entry is eligible for dispatch at `now`.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.next_retry_at <= now
    }
}

/// One planning attempt, successful or not. Append-only; contributes to the
/// sliding capacity window purely by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingRecord {
    pub repo: String,
    pub issue_number: u64,
    pub recorded_at: DateTime<Utc>,
    pub success: bool,

    /// Retry-after value reported by the upstream service, when it
    /// rate-limited the attempt.
    pub rate_limit_seconds: Option<u64>,
}

/// An operational error, logged for diagnostics. Not used for slot
/// accounting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorRecord {
    /// Coarse classification, e.g. "api_error"
    pub kind: String,
    pub message: String,
    pub repo: Option<String>,
    pub issue_number: Option<u64>,
    pub recorded_at: DateTime<Utc>,
}
