//! Simple momentum — buy any up bar, exit after a fixed hold.
//!
//! Trades frequently in any market condition, which makes it useful for
//! exercising the queue and execution paths.

use super::param;
use crate::clock::ClockRead;
use crate::domain::{HypothesisId, IntentKind, Params, PositionView, TradeIntent};
use crate::hypothesis::Hypothesis;
use crate::market::MarketView;

#[derive(Debug, Clone)]
pub struct SimpleMomentum {
    hold_bars: usize,
    size: f64,
    bars_held: usize,
}

impl SimpleMomentum {
    pub fn new(hold_bars: usize, size: f64) -> Self {
        Self {
            hold_bars,
            size,
            bars_held: 0,
        }
    }

    pub fn build(params: &Params) -> Box<dyn Hypothesis> {
        Box::new(Self::new(
            param(params, "hold_bars", 3.0) as usize,
            param(params, "size", 1.0),
        ))
    }
}

impl Hypothesis for SimpleMomentum {
    fn id(&self) -> HypothesisId {
        HypothesisId::new("simple_momentum")
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert("hold_bars".into(), self.hold_bars as f64);
        params.insert("size".into(), self.size);
        params
    }

    fn decide(
        &mut self,
        market: &MarketView<'_>,
        position: &PositionView<'_>,
        clock: &ClockRead<'_>,
    ) -> TradeIntent {
        let now = clock.now().expect("clock is set before decisions");

        if position.has_position() {
            self.bars_held += 1;
            if self.bars_held >= self.hold_bars {
                self.bars_held = 0;
                return TradeIntent::new(IntentKind::Close, self.size, now);
            }
            return TradeIntent::hold(now);
        }

        self.bars_held = 0;
        match market.current() {
            Some(bar) if bar.is_up() => TradeIntent::new(IntentKind::Buy, self.size, now),
            _ => TradeIntent::hold(now),
        }
    }
}
