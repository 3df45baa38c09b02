//! Always-long — sanity baseline: buy once, hold forever.
//!
//! Expected behavior: exactly one entry, no exit. Final P&L matches the
//! buy-and-hold benchmark measured from the entry fill (minus costs).

use super::param;
use crate::clock::ClockRead;
use crate::domain::{HypothesisId, IntentKind, Params, PositionView, TradeIntent};
use crate::hypothesis::Hypothesis;
use crate::market::MarketView;

#[derive(Debug, Clone)]
pub struct AlwaysLong {
    size: f64,
}

impl AlwaysLong {
    pub fn new(size: f64) -> Self {
        Self { size }
    }

    pub fn build(params: &Params) -> Box<dyn Hypothesis> {
        Box::new(Self::new(param(params, "size", 1.0)))
    }
}

impl Hypothesis for AlwaysLong {
    fn id(&self) -> HypothesisId {
        HypothesisId::new("always_long")
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert("size".into(), self.size);
        params
    }

    fn decide(
        &mut self,
        _market: &MarketView<'_>,
        position: &PositionView<'_>,
        clock: &ClockRead<'_>,
    ) -> TradeIntent {
        let now = clock.now().expect("clock is set before decisions");
        if position.has_position() {
            TradeIntent::hold(now)
        } else {
            TradeIntent::new(IntentKind::Buy, self.size, now)
        }
    }
}
