//! Retry backoff policies.
//!
//! When an attempt fails, the entry's `next_retry_at` moves forward under a
//! configurable policy. The exact curve the upstream service expects is
//! unknown, so the policy is pluggable; the default is exponential with a
//! base of one recharge window plus slack.

use crate::config::BackoffConfig;
use chrono::{DateTime, Duration, Utc};

/// Policy for computing the next retry time after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Same delay regardless of retry count.
    Fixed { minutes: i64 },
    /// Delay grows linearly with retry count.
    Linear { minutes: i64, max_minutes: i64 },
    /// Delay doubles with each retry, capped.
    Exponential { base_minutes: i64, max_minutes: i64 },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        // 32 minutes = 30-minute recharge window plus slack, doubling per
        // retry so persistently failing items stop crowding the queue.
        BackoffPolicy::Exponential {
            base_minutes: 32,
            max_minutes: 240,
        }
    }
}

impl BackoffPolicy {
    /// Build a policy from config, falling back to the default on an
    /// unrecognized kind.
    pub fn from_config(config: &BackoffConfig) -> Self {
        match config.kind.as_str() {
            "fixed" => BackoffPolicy::Fixed {
                minutes: config.base_minutes,
            },
            "linear" => BackoffPolicy::Linear {
                minutes: config.base_minutes,
                max_minutes: config.max_minutes,
            },
            "exponential" => BackoffPolicy::Exponential {
                base_minutes: config.base_minutes,
                max_minutes: config.max_minutes,
            },
            other => {
                log::warn!("Unknown backoff kind '{}', using default", other);
                BackoffPolicy::default()
            }
        }
    }

    /// Delay before the next attempt, given the retry count *after* the
    /// current failure (1 for the first failure).
    pub fn delay(&self, retry_count: u32) -> Duration {
        let minutes = match *self {
            BackoffPolicy::Fixed { minutes } => minutes,
            BackoffPolicy::Linear { minutes, max_minutes } => {
                (minutes * i64::from(retry_count.max(1))).min(max_minutes)
            }
            BackoffPolicy::Exponential {
                base_minutes,
                max_minutes,
            } => {
                // Cap the exponent so the shift cannot overflow
                let exp = retry_count.saturating_sub(1).min(16);
                (base_minutes * (1i64 << exp)).min(max_minutes)
            }
        };
        Duration::minutes(minutes)
    }

    /// Next eligibility time for an entry that just failed.
    pub fn next_retry_at(&self, now: DateTime<Utc>, retry_count: u32) -> DateTime<Utc> {
        now + self.delay(retry_count)
    }
}
