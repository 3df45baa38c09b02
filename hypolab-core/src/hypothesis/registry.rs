//! Static hypothesis registry — explicit id → constructor mapping.
//!
//! Populated once at process start; no dynamic discovery.

use super::catalog;
use super::Hypothesis;
use crate::domain::Params;
use std::collections::HashMap;
use thiserror::Error;

/// Constructor signature for registered hypotheses.
pub type BuildFn = fn(&Params) -> Box<dyn Hypothesis>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown hypothesis id '{0}'")]
    UnknownHypothesis(String),
}

/// Explicit id → constructor map.
#[derive(Default)]
pub struct HypothesisRegistry {
    builders: HashMap<String, BuildFn>,
}

impl HypothesisRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in catalog hypothesis.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("always_long", catalog::AlwaysLong::build);
        registry.register("simple_momentum", catalog::SimpleMomentum::build);
        registry.register("mean_reversion", catalog::MeanReversion::build);
        registry.register("volatility_breakout", catalog::VolatilityBreakout::build);
        registry
    }

    pub fn register(&mut self, id: &str, build: BuildFn) {
        self.builders.insert(id.to_string(), build);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.builders.contains_key(id)
    }

    pub fn build(&self, id: &str, params: &Params) -> Result<Box<dyn Hypothesis>, RegistryError> {
        let build = self
            .builders
            .get(id)
            .ok_or_else(|| RegistryError::UnknownHypothesis(id.to_string()))?;
        Ok(build(params))
    }

    /// Registered ids, sorted for stable display.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = HypothesisRegistry::with_builtins();
        assert_eq!(
            registry.ids(),
            vec![
                "always_long",
                "mean_reversion",
                "simple_momentum",
                "volatility_breakout"
            ]
        );
    }

    #[test]
    fn build_known_hypothesis() {
        let registry = HypothesisRegistry::with_builtins();
        let hypothesis = registry.build("always_long", &Params::new()).unwrap();
        assert_eq!(hypothesis.id().as_str(), "always_long");
    }

    #[test]
    fn unknown_id_rejected() {
        let registry = HypothesisRegistry::with_builtins();
        let err = registry.build("nope", &Params::new()).unwrap_err();
        assert_eq!(err, RegistryError::UnknownHypothesis("nope".into()));
    }

    #[test]
    fn params_reach_constructor() {
        let registry = HypothesisRegistry::with_builtins();
        let mut params = Params::new();
        params.insert("hold_bars".into(), 7.0);
        let hypothesis = registry.build("simple_momentum", &params).unwrap();
        assert_eq!(hypothesis.params()["hold_bars"], 7.0);
    }
}
