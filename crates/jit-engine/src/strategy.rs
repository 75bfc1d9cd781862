//! Strategy parameterization for fill tasks.
//!
//! Both strategies share one task shape; only the attempt bound, delays,
//! and whether a pre-attempt crossing wait happens differ.

use std::time::Duration;

/// Attempt-loop tuning for a fill strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyParams {
    /// Maximum fill attempts per order.
    pub max_attempts: u32,
    /// Delay after a retryable rejection before the next attempt.
    pub backoff: Duration,
    /// Cooldown after a successful submission before the task returns.
    pub success_cooldown: Duration,
    /// Whether to predict the crossing slot and wait for it before
    /// attempting (sniper), or attempt unconditionally (shotgun).
    pub predict: bool,
}

impl StrategyParams {
    /// Predict-then-wait-then-attempt.
    #[must_use]
    pub fn sniper() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(50),
            success_cooldown: Duration::from_secs(3),
            predict: true,
        }
    }

    /// Immediate repeated attempts, no prediction.
    #[must_use]
    pub fn shotgun() -> Self {
        Self {
            max_attempts: 10,
            backoff: Duration::from_millis(50),
            success_cooldown: Duration::from_secs(10),
            predict: false,
        }
    }
}
