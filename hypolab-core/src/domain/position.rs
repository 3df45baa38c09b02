//! Position and PositionState — the bounded trade-side of the book.
//!
//! `Position` is an immutable value; opening or closing replaces it
//! wholesale. `PositionState` holds at most one open position plus cash and
//! enforces the single-position rule at the type level.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of an open position. The book is long-only in this version;
/// a flat book is represented by the absence of a `Position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
}

impl PositionSide {
    /// P&L sign multiplier.
    pub fn sign(&self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
        }
    }
}

/// An open position — immutable value, replaced wholesale on change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub size: f64,
}

impl Position {
    pub fn market_value(&self, current_price: f64) -> f64 {
        self.size * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        (current_price - self.entry_price) * self.size * self.side.sign()
    }
}

/// Errors from position mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("a position is already open; at most one open position is allowed")]
    SinglePositionViolation,
    #[error("no open position to close")]
    NoOpenPosition,
}

/// Cash plus the current position-or-none.
///
/// Mutated only by the execution collaborator; hypotheses see it through the
/// read-only [`PositionView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    cash: f64,
    position: Option<Position>,
    /// Running total of execution costs debited from cash.
    total_costs: f64,
}

impl PositionState {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            position: None,
            total_costs: 0.0,
        }
    }

    /// Open a position, debiting `price * size` from cash.
    pub fn open(
        &mut self,
        side: PositionSide,
        price: f64,
        timestamp: NaiveDateTime,
        size: f64,
    ) -> Result<(), PositionError> {
        if self.position.is_some() {
            return Err(PositionError::SinglePositionViolation);
        }
        self.cash -= price * size;
        self.position = Some(Position {
            side,
            entry_price: price,
            entry_time: timestamp,
            size,
        });
        Ok(())
    }

    /// Close the open position, crediting `price * size` to cash.
    ///
    /// Returns the closed position and its realized P&L
    /// `(exit − entry) × size × sign(side)`, before costs. Costs are the
    /// execution collaborator's business and are debited via [`apply_cost`].
    ///
    /// [`apply_cost`]: PositionState::apply_cost
    pub fn close(
        &mut self,
        price: f64,
        _timestamp: NaiveDateTime,
    ) -> Result<(Position, f64), PositionError> {
        let position = self.position.take().ok_or(PositionError::NoOpenPosition)?;
        self.cash += price * position.size;
        let pnl = (price - position.entry_price) * position.size * position.side.sign();
        Ok((position, pnl))
    }

    /// Debit an execution cost (fee + slippage) from cash.
    pub fn apply_cost(&mut self, amount: f64) {
        self.cash -= amount;
        self.total_costs += amount;
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn total_costs(&self) -> f64 {
        self.total_costs
    }

    /// Unrealized P&L of the open position at `current_price`, or 0.0 when flat.
    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.position
            .as_ref()
            .map_or(0.0, |p| p.unrealized_pnl(current_price))
    }

    /// Total capital: cash + mark-to-market position value.
    pub fn total_capital(&self, current_price: f64) -> f64 {
        let position_value = self
            .position
            .as_ref()
            .map_or(0.0, |p| p.market_value(current_price));
        self.cash + position_value
    }

    /// Read-only view for hypotheses.
    pub fn view(&self) -> PositionView<'_> {
        PositionView { state: self }
    }
}

/// Read-only window onto [`PositionState`].
///
/// This is the only position type a hypothesis ever receives: it exposes
/// queries but no mutators, so a decision function is structurally unable to
/// trade directly.
#[derive(Debug, Clone, Copy)]
pub struct PositionView<'a> {
    state: &'a PositionState,
}

impl PositionView<'_> {
    pub fn has_position(&self) -> bool {
        self.state.has_position()
    }

    pub fn position(&self) -> Option<&Position> {
        self.state.position()
    }

    pub fn cash(&self) -> f64 {
        self.state.cash()
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.state.unrealized_pnl(current_price)
    }

    pub fn total_capital(&self, current_price: f64) -> f64 {
        self.state.total_capital(current_price)
    }
}
