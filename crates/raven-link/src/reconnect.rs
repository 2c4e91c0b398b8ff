//! Reconnection configuration and jittered exponential backoff.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on the un-jittered delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Growth factor per attempt.
    pub backoff_multiplier: f64,
    /// Symmetric jitter as a fraction of the delay (0.2 = ±20%).
    pub jitter_ratio: f64,
    /// Retries allowed before giving up.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            backoff_multiplier: 1.5,
            jitter_ratio: 0.2,
            max_attempts: 30,
        }
    }
}

impl ReconnectConfig {
    /// Un-jittered delay after `attempt` prior retries.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.delay_millis(attempt) as u64)
    }

    /// Delay after `attempt` prior retries with jitter applied.
    ///
    /// `unit` is a sample from `[0, 1)`; 0 yields the shortest delay and
    /// values approaching 1 the longest.
    #[must_use]
    pub fn jittered_delay(&self, attempt: u32, unit: f64) -> Duration {
        let delay = self.delay_millis(attempt);
        let jitter = delay * (2.0 * self.jitter_ratio * unit - self.jitter_ratio);
        Duration::from_millis((delay + jitter).floor().max(0.0) as u64)
    }

    /// Jittered delay using the thread-local RNG.
    #[must_use]
    pub fn next_delay(&self, attempt: u32) -> Duration {
        self.jittered_delay(attempt, rand::thread_rng().gen_range(0.0..1.0))
    }

    /// Check if another retry is allowed after `attempt` prior retries.
    #[must_use]
    pub const fn should_reconnect(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), LinkError> {
        if self.base_delay_ms == 0 {
            return Err(LinkError::Config(
                "reconnect.base_delay_ms must be greater than 0".to_string(),
            ));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(LinkError::Config(
                "reconnect.max_delay_ms must not be below base_delay_ms".to_string(),
            ));
        }

        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(LinkError::Config(
                "reconnect.backoff_multiplier must be at least 1.0".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.jitter_ratio) {
            return Err(LinkError::Config(
                "reconnect.jitter_ratio must be in [0, 1)".to_string(),
            ));
        }

        Ok(())
    }

    fn delay_millis(&self, attempt: u32) -> f64 {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        delay.min(self.max_delay_ms as f64)
    }
}
