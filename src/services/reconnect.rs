//! Delay policy for re-establishing the broker connection
//!
//! Retries are unbounded; the policy only decides how long to wait
//! between two attempts.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconnectPolicy {
    /// Same delay before every attempt
    Fixed { delay_secs: u64 },
    /// Delay grows by `multiplier` after each failure, capped at `max_delay_secs`
    Exponential {
        initial_delay_secs: u64,
        max_delay_secs: u64,
        multiplier: f64,
    },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Fixed { delay_secs: 5 }
    }
}

impl ReconnectPolicy {
    /// Every delay must be positive and never shrink, or retries spin
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ReconnectPolicy::Fixed { delay_secs } => {
                if *delay_secs == 0 {
                    return Err("delay_secs must be at least 1".to_string());
                }
            }
            ReconnectPolicy::Exponential {
                initial_delay_secs,
                max_delay_secs,
                multiplier,
            } => {
                if *initial_delay_secs == 0 {
                    return Err("initial_delay_secs must be at least 1".to_string());
                }
                if max_delay_secs < initial_delay_secs {
                    return Err("max_delay_secs must not be below initial_delay_secs".to_string());
                }
                // Also rejects NaN
                if !(multiplier.is_finite() && *multiplier > 1.0) {
                    return Err(format!("multiplier must be greater than 1, got {}", multiplier));
                }
            }
        }
        Ok(())
    }

    /// Delay before the first retry after a successful session ends
    pub fn initial_delay(&self) -> Duration {
        match self {
            ReconnectPolicy::Fixed { delay_secs } => Duration::from_secs(*delay_secs),
            ReconnectPolicy::Exponential {
                initial_delay_secs, ..
            } => Duration::from_secs(*initial_delay_secs),
        }
    }

    /// Delay that follows `current`
    pub fn next_delay(&self, current: Duration) -> Duration {
        match self {
            ReconnectPolicy::Fixed { delay_secs } => Duration::from_secs(*delay_secs),
            ReconnectPolicy::Exponential {
                max_delay_secs,
                multiplier,
                ..
            } => {
                let next_ms = (current.as_millis() as f64 * multiplier) as u64;
                Duration::from_millis(next_ms).min(Duration::from_secs(*max_delay_secs))
            }
        }
    }
}
