//! Evaluation runner — wires config, bars, and registry into one replay.

use hypolab_core::config::ConfigError as CoreConfigError;
use hypolab_core::domain::{Bar, CompletedTrade, ParamsHash};
use hypolab_core::engine::{ReplayEngine, ReplayError, ReplaySummary};
use hypolab_core::execution::{IgnoredIntent, NextBarOpenExecutor};
use hypolab_core::hypothesis::{HypothesisRegistry, RegistryError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, RunConfig};
use crate::data::{validate_bars, LoadError};
use crate::metrics::{buy_and_hold_return, PerformanceMetrics};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("config error: {0}")]
    CoreConfig(#[from] CoreConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub hypothesis_id: String,
    pub params_hash: ParamsHash,
    pub metrics: PerformanceMetrics,
    /// Buy-and-hold over the same bars, with the same round-trip costs.
    pub benchmark_return: f64,
    pub trades: Vec<CompletedTrade>,
    pub equity_curve: Vec<f64>,
    /// Released intents that resolved to no-ops.
    pub ignored: Vec<IgnoredIntent>,
    /// Intents still pending at termination (dropped, reported).
    pub unexecuted_count: usize,
    pub bar_count: usize,
    pub initial_capital: f64,
    pub final_equity: f64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl EvaluationResult {
    fn from_summary(config: &RunConfig, bars: &[Bar], summary: ReplaySummary) -> Self {
        let metrics = PerformanceMetrics::compute(&summary.equity_curve, &summary.trades);
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: config.run_id(),
            hypothesis_id: config.hypothesis.id.clone(),
            params_hash: config.params_hash(),
            metrics,
            benchmark_return: buy_and_hold_return(bars, config.costs.fee_bps + config.costs.slippage_bps),
            trades: summary.trades,
            equity_curve: summary.equity_curve,
            ignored: summary.ignored,
            unexecuted_count: summary.unexecuted.len(),
            bar_count: summary.bar_count,
            initial_capital: summary.initial_capital,
            final_equity: summary.final_equity,
        }
    }

    /// Window return factor, for compounding shadow curves.
    pub fn return_factor(&self) -> f64 {
        if self.initial_capital <= 0.0 {
            return 1.0;
        }
        self.final_equity / self.initial_capital
    }
}

/// Run one evaluation: validate the bars, build a fresh engine (disjoint
/// clock/market/book/queue), replay, compute metrics.
pub fn run_evaluation(
    config: &RunConfig,
    bars: &[Bar],
    registry: &HypothesisRegistry,
) -> Result<EvaluationResult, RunError> {
    config.validate()?;
    validate_bars(bars)?;

    let hypothesis = registry.build(&config.hypothesis.id, &config.hypothesis.params)?;
    let executor = NextBarOpenExecutor::new(config.costs.to_cost_model());
    let mut engine = ReplayEngine::new(
        config.replay.to_replay_config(),
        hypothesis,
        Box::new(executor),
    )?;
    let summary = engine.run(&mut bars.iter().cloned())?;
    Ok(EvaluationResult::from_summary(config, bars, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HypothesisConfig;
    use crate::data::synthetic_bars;

    fn config(id: &str) -> RunConfig {
        RunConfig {
            hypothesis: HypothesisConfig {
                id: id.into(),
                params: Default::default(),
            },
            replay: Default::default(),
            costs: Default::default(),
            guardrails: Default::default(),
            decay: Default::default(),
            campaign: Default::default(),
        }
    }

    #[test]
    fn momentum_evaluation_produces_trades() {
        let bars = synthetic_bars(11, 400, 100.0);
        let registry = HypothesisRegistry::with_builtins();
        let result = run_evaluation(&config("simple_momentum"), &bars, &registry).unwrap();

        assert_eq!(result.bar_count, 400);
        assert_eq!(result.equity_curve.len(), 400);
        assert!(result.metrics.trade_count > 0);
        assert_eq!(result.metrics.trade_count, result.trades.len());
    }

    #[test]
    fn unknown_hypothesis_is_an_error() {
        let bars = synthetic_bars(11, 50, 100.0);
        let registry = HypothesisRegistry::with_builtins();
        let err = run_evaluation(&config("missing"), &bars, &registry).unwrap_err();
        assert!(matches!(err, RunError::Registry(_)));
    }

    #[test]
    fn malformed_data_is_fatal() {
        let mut bars = synthetic_bars(11, 50, 100.0);
        bars[10].low = bars[10].high + 1.0;
        let registry = HypothesisRegistry::with_builtins();
        let err = run_evaluation(&config("always_long"), &bars, &registry).unwrap_err();
        assert!(matches!(err, RunError::Data(LoadError::MalformedBar { index: 10, .. })));
    }

    #[test]
    fn result_serialization_roundtrip() {
        let bars = synthetic_bars(3, 120, 100.0);
        let registry = HypothesisRegistry::with_builtins();
        let result = run_evaluation(&config("simple_momentum"), &bars, &registry).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let deser: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, deser);
    }
}
