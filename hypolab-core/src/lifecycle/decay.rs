//! Decay policy — automatic retirement triggers over the shadow equity
//! curve.
//!
//! Checked on every shadow-curve append, in fixed order; the first satisfied
//! trigger wins and the resulting transition is immediate and irreversible:
//! 1. Running drawdown from the curve's peak exceeds the threshold
//! 2. Sharpe over the curve's window returns has fallen more than the
//!    configured percentage below its promotion-time value
//! 3. N consecutive windows show negative return

use super::record::ShadowPoint;
use serde::{Deserialize, Serialize};

/// Why a hypothesis decayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecayReason {
    DrawdownBreach {
        observed: f64,
        limit: f64,
    },
    SharpeDrop {
        at_promotion: f64,
        current: f64,
        drop_pct: f64,
        limit_pct: f64,
    },
    NegativeStreak {
        windows: usize,
    },
}

/// Verdict of one decay check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecayVerdict {
    Healthy,
    Decayed(DecayReason),
}

impl DecayVerdict {
    pub fn is_decayed(&self) -> bool {
        matches!(self, DecayVerdict::Decayed(_))
    }
}

/// Decay thresholds. Immutable once configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayPolicy {
    /// Largest tolerated shadow drawdown, as a positive fraction.
    pub max_shadow_drawdown: f64,
    /// Largest tolerated relative Sharpe drop versus promotion time
    /// (0.5 = Sharpe may not fall more than 50% below its promotion value).
    pub max_sharpe_drop_pct: f64,
    /// Consecutive negative shadow windows before retirement.
    pub max_negative_windows: usize,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self {
            max_shadow_drawdown: 0.20,
            max_sharpe_drop_pct: 0.50,
            max_negative_windows: 3,
        }
    }
}

impl DecayPolicy {
    /// Evaluate the triggers against the full shadow curve (anchor point
    /// first) and the Sharpe recorded at promotion.
    pub fn evaluate(&self, curve: &[ShadowPoint], sharpe_at_promotion: f64) -> DecayVerdict {
        if let Some(reason) = self.check_drawdown(curve) {
            return DecayVerdict::Decayed(reason);
        }
        if let Some(reason) = self.check_sharpe_drop(curve, sharpe_at_promotion) {
            return DecayVerdict::Decayed(reason);
        }
        if let Some(reason) = self.check_negative_streak(curve) {
            return DecayVerdict::Decayed(reason);
        }
        DecayVerdict::Healthy
    }

    fn check_drawdown(&self, curve: &[ShadowPoint]) -> Option<DecayReason> {
        let drawdown = running_drawdown(curve);
        if drawdown > self.max_shadow_drawdown {
            Some(DecayReason::DrawdownBreach {
                observed: drawdown,
                limit: self.max_shadow_drawdown,
            })
        } else {
            None
        }
    }

    fn check_sharpe_drop(
        &self,
        curve: &[ShadowPoint],
        sharpe_at_promotion: f64,
    ) -> Option<DecayReason> {
        // A non-positive baseline cannot meaningfully "fall by X%"; the
        // drawdown and streak triggers still guard such records.
        if sharpe_at_promotion <= 0.0 {
            return None;
        }
        let returns = window_returns(curve);
        if returns.len() < 2 {
            return None;
        }
        let current = sharpe(&returns);
        let drop_pct = (sharpe_at_promotion - current) / sharpe_at_promotion;
        if drop_pct > self.max_sharpe_drop_pct {
            Some(DecayReason::SharpeDrop {
                at_promotion: sharpe_at_promotion,
                current,
                drop_pct,
                limit_pct: self.max_sharpe_drop_pct,
            })
        } else {
            None
        }
    }

    fn check_negative_streak(&self, curve: &[ShadowPoint]) -> Option<DecayReason> {
        if self.max_negative_windows == 0 {
            return None;
        }
        let returns = window_returns(curve);
        let streak = returns.iter().rev().take_while(|&&r| r < 0.0).count();
        if streak >= self.max_negative_windows {
            Some(DecayReason::NegativeStreak { windows: streak })
        } else {
            None
        }
    }
}

// ─── Shadow-curve arithmetic ─────────────────────────────────────────

/// Drawdown of the curve's final point from its running peak, as a positive
/// fraction.
pub fn running_drawdown(curve: &[ShadowPoint]) -> f64 {
    let mut peak = f64::MIN;
    for point in curve {
        if point.equity > peak {
            peak = point.equity;
        }
    }
    let last = match curve.last() {
        Some(point) => point.equity,
        None => return 0.0,
    };
    if peak <= 0.0 {
        return 0.0;
    }
    ((peak - last) / peak).max(0.0)
}

/// Simple returns between consecutive shadow points.
pub fn window_returns(curve: &[ShadowPoint]) -> Vec<f64> {
    curve
        .windows(2)
        .filter(|pair| pair[0].equity > 0.0)
        .map(|pair| pair[1].equity / pair[0].equity - 1.0)
        .collect()
}

/// Un-annualized Sharpe over window returns: mean / std. Zero when variance
/// vanishes — shadow windows are not daily bars, so no annualization factor
/// applies.
pub fn sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std < 1e-12 {
        return 0.0;
    }
    mean / std
}
