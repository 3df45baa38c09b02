//! Hypothesis contract — pure decision policies over read-only views.
//!
//! A hypothesis maps observed state to a [`TradeIntent`]. Its signature only
//! accepts read-only view types, so a decision function is structurally
//! unable to reach the decision queue, execution, or persistence — the
//! isolation is enforced by the type system, not by convention.

pub mod catalog;
pub mod registry;

use crate::clock::ClockRead;
use crate::domain::{HypothesisId, Params, PositionView, TradeIntent};
use crate::market::MarketView;

pub use registry::{HypothesisRegistry, RegistryError};

/// A trading decision policy.
///
/// Called once per bar with read-only views of committed state. May keep
/// internal counters (holding periods and the like) between calls, but must
/// be deterministic: same view sequence in, same intent sequence out.
pub trait Hypothesis: std::fmt::Debug {
    /// Identifier under which this hypothesis is registered.
    fn id(&self) -> HypothesisId;

    /// Parameters for experiment tracking and hashing.
    fn params(&self) -> Params;

    /// Decide what to do given the current committed state.
    ///
    /// Returning a HOLD intent means "do nothing"; it is never enqueued.
    fn decide(
        &mut self,
        market: &MarketView<'_>,
        position: &PositionView<'_>,
        clock: &ClockRead<'_>,
    ) -> TradeIntent;
}
