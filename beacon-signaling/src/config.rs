use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff applied to transient store failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 50,
            max_backoff_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignalingConfig {
    /// Root collection holding room records.
    pub rooms_collection: String,
    pub retry: RetryPolicy,
    /// Local candidates that may be dropped after exhausting retries before the call fails.
    pub candidate_loss_limit: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            rooms_collection: "rooms".to_owned(),
            retry: RetryPolicy::default(),
            candidate_loss_limit: 8,
        }
    }
}
