//! External activity probe.
//!
//! The planning service is shared with callers we cannot see. The probe
//! reports total observed activity on it within a time window, as broadly
//! as available telemetry allows. The signal includes our own attempts;
//! the slot calculator subtracts those. Probe failures are recoverable by
//! contract: the calculator degrades to zero external activity, it never
//! re-throws.

pub mod github;

pub use github::{GithubProbeConfig, GithubSearchProbe};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Errors a probe can fail with. All of them are recoverable from the
/// calculator's point of view.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Probe network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Probe API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Probe returned malformed payload: {0}")]
    InvalidResponse(String),
}

/// Source of the external activity signal.
#[async_trait]
pub trait ActivityProbe: Send + Sync {
    /// Total activity observed on the shared service since `since`,
    /// including this tool's own attempts.
    async fn external_activity(&self, since: DateTime<Utc>) -> Result<u64, ProbeError>;
}

/// Probe with a canned answer. Used in tests and as the wiring when the
/// probe is disabled in config.
pub struct StaticProbe {
    answer: Option<u64>,
}

impl StaticProbe {
    /// Always report the given activity count.
    pub fn with_activity(count: u64) -> Self {
        Self { answer: Some(count) }
    }

    /// Always fail, simulating an unreachable or timed-out probe.
    pub fn failing() -> Self {
        Self { answer: None }
    }

    /// Always report zero activity.
    pub fn disabled() -> Self {
        Self::with_activity(0)
    }
}

#[async_trait]
impl ActivityProbe for StaticProbe {
    async fn external_activity(&self, _since: DateTime<Utc>) -> Result<u64, ProbeError> {
        match self.answer {
            Some(count) => Ok(count),
            None => Err(ProbeError::Timeout(Duration::from_secs(10))),
        }
    }
}
