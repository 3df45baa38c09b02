//! Promotion guardrails — hard rules that prevent self-deception.
//!
//! A hypothesis is promoted only if EVERY configured guardrail passes. The
//! policy is an immutable record; its hash is stored on the hypothesis
//! record at promotion time so the exact bar can be audited later.

use serde::{Deserialize, Serialize};

/// Inputs to the promotion decision, computed by the evaluation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub trade_count: usize,
    pub sharpe: f64,
    /// Total return as a fraction of initial capital.
    pub total_return: f64,
    /// Maximum drawdown as a negative fraction (e.g. -0.15).
    pub max_drawdown: f64,
}

/// Promotion thresholds. Immutable once constructed; hash with
/// [`policy_hash`](PromotionGuardrails::policy_hash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionGuardrails {
    pub min_trades: usize,
    pub min_sharpe: f64,
    pub min_total_return: f64,
    /// Largest tolerated drawdown, as a positive fraction (0.25 = 25%).
    pub max_drawdown: f64,
}

impl Default for PromotionGuardrails {
    fn default() -> Self {
        Self {
            min_trades: 30,
            min_sharpe: 0.3,
            min_total_return: 0.0,
            max_drawdown: 0.25,
        }
    }
}

/// Outcome of a guardrail check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuardrailVerdict {
    Promoted,
    Rejected { reasons: Vec<String> },
}

impl GuardrailVerdict {
    pub fn is_promoted(&self) -> bool {
        matches!(self, GuardrailVerdict::Promoted)
    }
}

impl PromotionGuardrails {
    /// Run every check; all must pass. Failing reasons are collected, not
    /// short-circuited, so a rejection explains itself fully.
    pub fn verify(&self, summary: &EvaluationSummary) -> GuardrailVerdict {
        let mut reasons = Vec::new();

        if summary.trade_count < self.min_trades {
            reasons.push(format!(
                "insufficient trades: {} < {}",
                summary.trade_count, self.min_trades
            ));
        }
        if summary.sharpe < self.min_sharpe {
            reasons.push(format!(
                "Sharpe too low: {:.3} < {:.3}",
                summary.sharpe, self.min_sharpe
            ));
        }
        if summary.total_return < self.min_total_return {
            reasons.push(format!(
                "total return too low: {:.4} < {:.4}",
                summary.total_return, self.min_total_return
            ));
        }
        if summary.max_drawdown.abs() > self.max_drawdown {
            reasons.push(format!(
                "drawdown too deep: {:.1}% > {:.1}%",
                summary.max_drawdown.abs() * 100.0,
                self.max_drawdown * 100.0
            ));
        }

        if reasons.is_empty() {
            GuardrailVerdict::Promoted
        } else {
            GuardrailVerdict::Rejected { reasons }
        }
    }

    /// BLAKE3 hash of the canonical policy serialization.
    pub fn policy_hash(&self) -> String {
        let json = serde_json::to_string(self).expect("guardrail policy must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_summary() -> EvaluationSummary {
        EvaluationSummary {
            trade_count: 40,
            sharpe: 1.2,
            total_return: 0.15,
            max_drawdown: -0.10,
        }
    }

    #[test]
    fn all_pass_promotes() {
        let guardrails = PromotionGuardrails::default();
        assert!(guardrails.verify(&passing_summary()).is_promoted());
    }

    #[test]
    fn insufficient_trades_rejected() {
        let guardrails = PromotionGuardrails::default();
        let mut summary = passing_summary();
        summary.trade_count = 29;
        match guardrails.verify(&summary) {
            GuardrailVerdict::Rejected { reasons } => {
                assert_eq!(reasons.len(), 1);
                assert!(reasons[0].contains("insufficient trades"));
            }
            GuardrailVerdict::Promoted => panic!("must be rejected"),
        }
    }

    #[test]
    fn every_failure_is_reported() {
        let guardrails = PromotionGuardrails::default();
        let summary = EvaluationSummary {
            trade_count: 5,
            sharpe: -0.5,
            total_return: -0.2,
            max_drawdown: -0.6,
        };
        match guardrails.verify(&summary) {
            GuardrailVerdict::Rejected { reasons } => assert_eq!(reasons.len(), 4),
            GuardrailVerdict::Promoted => panic!("must be rejected"),
        }
    }

    #[test]
    fn boundary_values_pass() {
        let guardrails = PromotionGuardrails::default();
        let summary = EvaluationSummary {
            trade_count: 30,
            sharpe: 0.3,
            total_return: 0.0,
            max_drawdown: -0.25,
        };
        assert!(guardrails.verify(&summary).is_promoted());
    }

    #[test]
    fn policy_hash_is_stable_and_sensitive() {
        let a = PromotionGuardrails::default();
        let b = PromotionGuardrails::default();
        assert_eq!(a.policy_hash(), b.policy_hash());

        let mut c = PromotionGuardrails::default();
        c.min_sharpe = 0.5;
        assert_ne!(a.policy_hash(), c.policy_hash());
    }
}
