//! Execution collaborator — turns released intents into position changes.
//!
//! Released intents fill at the releasing bar's OPEN price (next-bar-open
//! discipline). Conflicting intents — a BUY while a position is already
//! open, an exit while flat — are recorded as no-ops, never raised as
//! errors: conflict resolution is this collaborator's documented
//! responsibility.

use crate::domain::{
    Bar, CompletedTrade, IntentKind, PositionSide, PositionState, TradeIntent,
};
use crate::queue::QueuedIntent;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Cost model ──────────────────────────────────────────────────────

/// Execution friction in basis points (1 bps = 0.01%).
///
/// Fee and slippage are combined into a single directional charge: buyers
/// pay up, sellers receive less. Costs are debited from cash explicitly, so
/// recorded entry/exit prices stay raw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub fee_bps: f64,
    pub slippage_bps: f64,
}

impl CostModel {
    pub fn new(fee_bps: f64, slippage_bps: f64) -> Self {
        Self {
            fee_bps,
            slippage_bps,
        }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn total_bps(&self) -> f64 {
        self.fee_bps + self.slippage_bps
    }

    /// Dollar cost of one side of a trade at `price` for `size` units.
    pub fn cost_amount(&self, price: f64, size: f64) -> f64 {
        price * size * (self.total_bps() / 10_000.0)
    }
}

impl Default for CostModel {
    fn default() -> Self {
        // Matches the default research settings: 10 bps fee + 5 bps slippage.
        Self::new(10.0, 5.0)
    }
}

// ─── Ignored intents ─────────────────────────────────────────────────

/// Why a released intent was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// BUY released while a position is already open.
    AlreadyOpen,
    /// SELL/CLOSE released while flat.
    NoOpenPosition,
    /// HOLD should never be enqueued; released HOLDs are dropped.
    HoldReleased,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::AlreadyOpen => write!(f, "position already open"),
            IgnoreReason::NoOpenPosition => write!(f, "no open position"),
            IgnoreReason::HoldReleased => write!(f, "hold intent released"),
        }
    }
}

/// Record of a released intent that resolved to a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IgnoredIntent {
    pub intent: TradeIntent,
    pub bar_index: usize,
    pub reason: IgnoreReason,
}

/// Everything an execution pass produced for one bar.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    pub trades: Vec<CompletedTrade>,
    pub ignored: Vec<IgnoredIntent>,
}

// ─── Execution model ─────────────────────────────────────────────────

/// The execution collaborator contract.
///
/// Implementations receive the intents released this bar, the releasing bar
/// itself, and mutable position state; they return fills and no-op reports.
/// Conflicts are reported, never thrown.
pub trait ExecutionModel {
    fn execute(
        &mut self,
        due: &[QueuedIntent],
        bar: &Bar,
        bar_index: usize,
        book: &mut PositionState,
    ) -> ExecutionOutcome;
}

/// Default executor: fills every released intent at the bar's open price,
/// applying the basis-point cost model on each side.
#[derive(Debug, Clone)]
pub struct NextBarOpenExecutor {
    cost: CostModel,
    /// Bar index of the current position's entry fill.
    entry_bar: Option<usize>,
}

impl NextBarOpenExecutor {
    pub fn new(cost: CostModel) -> Self {
        Self {
            cost,
            entry_bar: None,
        }
    }

    pub fn frictionless() -> Self {
        Self::new(CostModel::frictionless())
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost
    }
}

impl ExecutionModel for NextBarOpenExecutor {
    fn execute(
        &mut self,
        due: &[QueuedIntent],
        bar: &Bar,
        bar_index: usize,
        book: &mut PositionState,
    ) -> ExecutionOutcome {
        let mut outcome = ExecutionOutcome::default();
        let fill_price = bar.open;

        for entry in due {
            match entry.intent.kind {
                IntentKind::Buy => {
                    if book.has_position() {
                        outcome.ignored.push(IgnoredIntent {
                            intent: entry.intent,
                            bar_index,
                            reason: IgnoreReason::AlreadyOpen,
                        });
                        continue;
                    }
                    let size = entry.intent.size;
                    book.open(PositionSide::Long, fill_price, bar.timestamp, size)
                        .expect("book verified flat before open");
                    book.apply_cost(self.cost.cost_amount(fill_price, size));
                    self.entry_bar = Some(bar_index);
                }
                IntentKind::Sell | IntentKind::Close => {
                    if !book.has_position() {
                        outcome.ignored.push(IgnoredIntent {
                            intent: entry.intent,
                            bar_index,
                            reason: IgnoreReason::NoOpenPosition,
                        });
                        continue;
                    }
                    let (position, gross_pnl) = book
                        .close(fill_price, bar.timestamp)
                        .expect("book verified open before close");
                    let entry_cost = self.cost.cost_amount(position.entry_price, position.size);
                    let exit_cost = self.cost.cost_amount(fill_price, position.size);
                    book.apply_cost(exit_cost);
                    let cost = entry_cost + exit_cost;
                    let bars_held = self
                        .entry_bar
                        .take()
                        .map_or(0, |entry_bar| bar_index.saturating_sub(entry_bar));
                    outcome.trades.push(CompletedTrade {
                        side: position.side,
                        entry_time: position.entry_time,
                        entry_price: position.entry_price,
                        exit_time: bar.timestamp,
                        exit_price: fill_price,
                        size: position.size,
                        gross_pnl,
                        cost,
                        net_pnl: gross_pnl - cost,
                        bars_held,
                    });
                }
                IntentKind::Hold => {
                    outcome.ignored.push(IgnoredIntent {
                        intent: entry.intent,
                        bar_index,
                        reason: IgnoreReason::HoldReleased,
                    });
                }
            }
        }

        outcome
    }
}
