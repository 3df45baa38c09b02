//! Identity types — hypothesis ids and deterministic parameter hashes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier under which a hypothesis is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HypothesisId(pub String);

impl HypothesisId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HypothesisId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Hypothesis parameters, keyed deterministically.
///
/// `BTreeMap` gives sorted keys during serialization, so the same parameter
/// set always hashes identically regardless of insertion order.
pub type Params = BTreeMap<String, f64>;

/// BLAKE3 hash of a canonical parameter serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamsHash(pub String);

impl ParamsHash {
    /// Hash a parameter map. Deterministic across builds and platforms.
    pub fn of(params: &Params) -> Self {
        let json = serde_json::to_string(params).expect("BTreeMap<String, f64> must serialize");
        Self(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

impl fmt::Display for ParamsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
