//! CompletedTrade — an append-only round-trip record.

use super::position::PositionSide;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A complete round-trip trade: entry → exit.
///
/// Produced by the execution collaborator when a position closes; never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrade {
    pub side: PositionSide,

    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,

    pub size: f64,

    /// Realized P&L before costs.
    pub gross_pnl: f64,
    /// Total execution cost (fee + slippage, both sides).
    pub cost: f64,
    /// `gross_pnl - cost`.
    pub net_pnl: f64,

    /// Bars held, entry bar exclusive.
    pub bars_held: usize,
}

impl CompletedTrade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }

    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.size == 0.0 {
            return 0.0;
        }
        self.net_pnl / (self.entry_price * self.size)
    }
}
