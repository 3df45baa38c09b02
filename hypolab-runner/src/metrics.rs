//! Performance metrics — pure functions over equity curves and trade lists.
//!
//! Every metric is a pure function: curve and/or trades in, scalar out.
//! No dependencies on the engine or the store.

use hypolab_core::domain::{Bar, CompletedTrade};
use hypolab_core::lifecycle::EvaluationSummary;
use serde::{Deserialize, Serialize};

/// Aggregate performance metrics for a single evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub sharpe: f64,
    /// Maximum drawdown as a negative fraction (e.g. -0.15 = 15% drawdown).
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub trade_count: usize,
}

impl PerformanceMetrics {
    pub fn compute(equity_curve: &[f64], trades: &[CompletedTrade]) -> Self {
        Self {
            total_return: total_return(equity_curve),
            sharpe: sharpe_ratio(equity_curve),
            max_drawdown: max_drawdown(equity_curve),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            trade_count: trades.len(),
        }
    }

    /// The guardrail inputs this run produced.
    pub fn evaluation_summary(&self) -> EvaluationSummary {
        EvaluationSummary {
            trade_count: self.trade_count,
            sharpe: self.sharpe,
            total_return: self.total_return,
            max_drawdown: self.max_drawdown,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let initial = equity_curve[0];
    let final_eq = *equity_curve.last().unwrap();
    if initial <= 0.0 {
        return 0.0;
    }
    (final_eq - initial) / initial
}

/// Annualized Sharpe ratio from per-bar returns.
///
/// Sharpe = mean(returns) / std(returns) * sqrt(252), zero risk-free rate.
/// Returns 0.0 for fewer than 2 returns or vanishing variance.
pub fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns = bar_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * (252.0_f64).sqrt()
}

/// Maximum drawdown as a negative fraction.
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;
    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Fraction of trades with positive net P&L. Zero when there are no trades.
pub fn win_rate(trades: &[CompletedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Gross profit / gross loss. Zero with no trades.
///
/// A loss-free trade list reports `f64::MAX` rather than infinity so the
/// value survives a JSON round trip.
pub fn profit_factor(trades: &[CompletedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades.iter().map(|t| t.net_pnl.max(0.0)).sum();
    let gross_loss: f64 = trades.iter().map(|t| (-t.net_pnl).max(0.0)).sum();
    if gross_loss < 1e-15 {
        return if gross_profit > 0.0 { f64::MAX } else { 0.0 };
    }
    gross_profit / gross_loss
}

/// Simple per-bar returns of an equity curve.
fn bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect()
}

/// Buy-and-hold benchmark return over a bar series: enter at the first
/// close, exit at the last close, optional round-trip costs in bps.
pub fn buy_and_hold_return(bars: &[Bar], cost_bps: f64) -> f64 {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return 0.0;
    };
    let factor = cost_bps / 10_000.0;
    let entry = first.close * (1.0 + factor);
    let exit = last.close * (1.0 - factor);
    if entry <= 0.0 {
        return 0.0;
    }
    (exit - entry) / entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hypolab_core::domain::PositionSide;

    fn trade(net_pnl: f64) -> CompletedTrade {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        CompletedTrade {
            side: PositionSide::Long,
            entry_time: ts,
            entry_price: 100.0,
            exit_time: ts + chrono::Duration::days(1),
            exit_price: 100.0 + net_pnl,
            size: 1.0,
            gross_pnl: net_pnl,
            cost: 0.0,
            net_pnl,
            bars_held: 1,
        }
    }

    #[test]
    fn total_return_basic() {
        assert!((total_return(&[100.0, 110.0]) - 0.10).abs() < 1e-12);
        assert_eq!(total_return(&[100.0]), 0.0);
    }

    #[test]
    fn max_drawdown_finds_trough() {
        let curve = [100.0, 120.0, 90.0, 130.0];
        assert!((max_drawdown(&curve) - (-0.25)).abs() < 1e-12);
        assert_eq!(max_drawdown(&[100.0, 101.0, 102.0]), 0.0);
    }

    #[test]
    fn sharpe_zero_for_flat_curve() {
        assert_eq!(sharpe_ratio(&[100.0, 100.0, 100.0]), 0.0);
    }

    #[test]
    fn sharpe_positive_for_steady_gains_with_noise() {
        let curve: Vec<f64> = (0..50)
            .map(|i| 100.0 + i as f64 + if i % 2 == 0 { 0.1 } else { -0.05 })
            .collect();
        assert!(sharpe_ratio(&curve) > 0.0);
    }

    #[test]
    fn win_rate_and_profit_factor() {
        let trades = vec![trade(10.0), trade(-5.0), trade(20.0), trade(-5.0)];
        assert!((win_rate(&trades) - 0.5).abs() < 1e-12);
        assert!((profit_factor(&trades) - 3.0).abs() < 1e-12);
        assert_eq!(win_rate(&[]), 0.0);
        assert_eq!(profit_factor(&[]), 0.0);
    }

    #[test]
    fn profit_factor_no_losers_saturates() {
        let trades = vec![trade(10.0), trade(5.0)];
        assert_eq!(profit_factor(&trades), f64::MAX);
    }

    #[test]
    fn evaluation_summary_mirrors_metrics() {
        let metrics = PerformanceMetrics {
            total_return: 0.2,
            sharpe: 1.1,
            max_drawdown: -0.1,
            win_rate: 0.6,
            profit_factor: 2.0,
            trade_count: 42,
        };
        let summary = metrics.evaluation_summary();
        assert_eq!(summary.trade_count, 42);
        assert_eq!(summary.sharpe, 1.1);
        assert_eq!(summary.total_return, 0.2);
        assert_eq!(summary.max_drawdown, -0.1);
    }

    #[test]
    fn buy_and_hold_zero_cost() {
        let bars: Vec<Bar> = [100.0, 105.0, 110.0]
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1.0,
            })
            .collect();
        assert!((buy_and_hold_return(&bars, 0.0) - 0.10).abs() < 1e-12);
        // Costs shave the benchmark.
        assert!(buy_and_hold_return(&bars, 15.0) < 0.10);
    }
}
