//! Replay configuration, validated at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors caught before a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("execution delay must be at least 1 bar, got {0}")]
    InvalidDelay(usize),
    #[error("market window must be at least 1 bar when bounded")]
    InvalidWindow,
    #[error("initial capital must be positive, got {0}")]
    InvalidCapital(String),
}

/// Configuration for a single replay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Bars between decision and execution. Must be >= 1: an intent can
    /// never be released on the bar it was decided.
    pub delay_bars: usize,
    /// Number of most-recent bars retained in market state; `None` retains
    /// everything.
    pub window: Option<usize>,
    pub initial_capital: f64,
}

impl ReplayConfig {
    pub fn new(delay_bars: usize, window: Option<usize>, initial_capital: f64) -> Self {
        Self {
            delay_bars,
            window,
            initial_capital,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delay_bars < 1 {
            return Err(ConfigError::InvalidDelay(self.delay_bars));
        }
        if self.window == Some(0) {
            return Err(ConfigError::InvalidWindow);
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(ConfigError::InvalidCapital(self.initial_capital.to_string()));
        }
        Ok(())
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            delay_bars: 1,
            window: Some(100),
            initial_capital: 100_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ReplayConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_delay_rejected() {
        let config = ReplayConfig::new(0, None, 100_000.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidDelay(0)));
    }

    #[test]
    fn zero_window_rejected() {
        let config = ReplayConfig::new(1, Some(0), 100_000.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidWindow));
    }

    #[test]
    fn unbounded_window_allowed() {
        let config = ReplayConfig::new(1, None, 100_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nonpositive_capital_rejected() {
        let config = ReplayConfig::new(1, None, 0.0);
        assert!(config.validate().is_err());
    }
}
