//! Serializable run configuration (TOML).
//!
//! Captures everything needed to reproduce an evaluation: hypothesis id +
//! parameters, replay settings, cost model, guardrail and decay policies,
//! and campaign windowing. `run_id()` is a content-addressed BLAKE3 hash —
//! two identical configs share a run id.

use hypolab_core::config::{ConfigError as CoreConfigError, ReplayConfig};
use hypolab_core::domain::{Params, ParamsHash};
use hypolab_core::execution::CostModel;
use hypolab_core::lifecycle::{DecayPolicy, PromotionGuardrails};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Core(#[from] CoreConfigError),
    #[error("campaign windows must be at least 1 bar")]
    InvalidCampaignWindow,
}

/// Which hypothesis to run, and with what parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisConfig {
    pub id: String,
    #[serde(default)]
    pub params: Params,
}

/// Replay engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Bars between decision and execution. Must be >= 1.
    pub delay_bars: usize,
    /// Most-recent bars kept in market state; absent = unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookback_window: Option<usize>,
    pub initial_capital: f64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            delay_bars: 1,
            lookback_window: Some(100),
            initial_capital: 100_000.0,
        }
    }
}

impl ReplaySettings {
    pub fn to_replay_config(&self) -> ReplayConfig {
        ReplayConfig::new(self.delay_bars, self.lookback_window, self.initial_capital)
    }
}

/// Execution friction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub fee_bps: f64,
    pub slippage_bps: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            fee_bps: 10.0,
            slippage_bps: 5.0,
        }
    }
}

impl CostConfig {
    pub fn to_cost_model(&self) -> CostModel {
        CostModel::new(self.fee_bps, self.slippage_bps)
    }
}

/// Campaign windowing: one evaluation window followed by shadow windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSettings {
    /// Bars in the promotion evaluation window.
    pub evaluation_bars: usize,
    /// Bars per post-promotion shadow window.
    pub shadow_window_bars: usize,
    /// Maximum shadow windows to process (fewer if data runs out).
    pub max_shadow_windows: usize,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            evaluation_bars: 252,
            shadow_window_bars: 63,
            max_shadow_windows: 8,
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub hypothesis: HypothesisConfig,
    #[serde(default)]
    pub replay: ReplaySettings,
    #[serde(default)]
    pub costs: CostConfig,
    #[serde(default)]
    pub guardrails: PromotionGuardrails,
    #[serde(default)]
    pub decay: DecayPolicy,
    #[serde(default)]
    pub campaign: CampaignSettings,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.replay.to_replay_config().validate()?;
        if self.campaign.evaluation_bars < 1 || self.campaign.shadow_window_bars < 1 {
            return Err(ConfigError::InvalidCampaignWindow);
        }
        Ok(())
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Enables idempotent persistence: two runs with identical configs map
    /// to the same id.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("RunConfig must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn params_hash(&self) -> ParamsHash {
        ParamsHash::of(&self.hypothesis.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> RunConfig {
        RunConfig {
            hypothesis: HypothesisConfig {
                id: "simple_momentum".into(),
                params: {
                    let mut params = Params::new();
                    params.insert("hold_bars".into(), 3.0);
                    params
                },
            },
            replay: ReplaySettings::default(),
            costs: CostConfig::default(),
            guardrails: PromotionGuardrails::default(),
            decay: DecayPolicy::default(),
            campaign: CampaignSettings::default(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn run_id_deterministic_and_sensitive() {
        let a = sample_config();
        let b = sample_config();
        assert_eq!(a.run_id(), b.run_id());

        let mut c = sample_config();
        c.replay.delay_bars = 2;
        assert_ne!(a.run_id(), c.run_id());
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: RunConfig = toml::from_str(
            r#"
            [hypothesis]
            id = "always_long"
            "#,
        )
        .unwrap();
        assert_eq!(config.hypothesis.id, "always_long");
        assert_eq!(config.replay.delay_bars, 1);
        assert_eq!(config.costs.fee_bps, 10.0);
        assert_eq!(config.guardrails.min_trades, 30);
        assert_eq!(config.decay.max_negative_windows, 3);
    }

    #[test]
    fn full_toml_roundtrip() {
        let config = sample_config();
        let text = toml::to_string(&config).unwrap();
        let parsed: RunConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
        assert_eq!(config.run_id(), parsed.run_id());
    }

    #[test]
    fn invalid_delay_caught() {
        let mut config = sample_config();
        config.replay.delay_bars = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Core(CoreConfigError::InvalidDelay(0)))
        ));
    }

    #[test]
    fn invalid_campaign_window_caught() {
        let mut config = sample_config();
        config.campaign.shadow_window_bars = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCampaignWindow)
        ));
    }
}
