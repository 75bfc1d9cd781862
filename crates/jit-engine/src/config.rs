//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::strategy::StrategyParams;

/// Which strategy shape to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    #[default]
    Sniper,
    Shotgun,
}

/// Engine tuning.
///
/// The attempt/delay fields override the chosen strategy's defaults when
/// present; the defaults are tuned for ~400ms slot times and are not
/// assumed optimal for other chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Re-evaluation tick of the slot waiter (ms).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub strategy: StrategyChoice,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub backoff_ms: Option<u64>,
    #[serde(default)]
    pub success_cooldown_ms: Option<u64>,
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            strategy: StrategyChoice::default(),
            max_attempts: None,
            backoff_ms: None,
            success_cooldown_ms: None,
        }
    }
}

impl EngineConfig {
    /// Resolve the strategy defaults plus any overrides.
    #[must_use]
    pub fn strategy_params(&self) -> StrategyParams {
        let mut params = match self.strategy {
            StrategyChoice::Sniper => StrategyParams::sniper(),
            StrategyChoice::Shotgun => StrategyParams::shotgun(),
        };
        if let Some(max_attempts) = self.max_attempts {
            params.max_attempts = max_attempts;
        }
        if let Some(backoff_ms) = self.backoff_ms {
            params.backoff = Duration::from_millis(backoff_ms);
        }
        if let Some(cooldown_ms) = self.success_cooldown_ms {
            params.success_cooldown = Duration::from_millis(cooldown_ms);
        }
        params
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.strategy_params(), StrategyParams::sniper());
    }

    #[test]
    fn test_overrides_apply() {
        let config = EngineConfig {
            strategy: StrategyChoice::Shotgun,
            max_attempts: Some(5),
            backoff_ms: Some(10),
            success_cooldown_ms: Some(100),
            ..Default::default()
        };
        let params = config.strategy_params();
        assert_eq!(params.max_attempts, 5);
        assert_eq!(params.backoff, Duration::from_millis(10));
        assert_eq!(params.success_cooldown, Duration::from_millis(100));
        assert!(!params.predict);
    }

    #[test]
    fn test_toml_round_trip() {
        let parsed: EngineConfig = toml::from_str(
            r#"
            strategy = "shotgun"
            poll_interval_ms = 25
            "#,
        )
        .unwrap();
        assert_eq!(parsed.strategy, StrategyChoice::Shotgun);
        assert_eq!(parsed.poll_interval_ms, 25);
        assert!(parsed.max_attempts.is_none());
    }
}
