//! Volatility breakout — buy on range expansion, exit after a fixed hold.
//!
//! Performs in high-volatility regimes, dies in chop.

use super::param;
use crate::clock::ClockRead;
use crate::domain::{HypothesisId, IntentKind, Params, PositionView, TradeIntent};
use crate::hypothesis::Hypothesis;
use crate::market::MarketView;

/// Buy when the current bar's range exceeds `breakout_mult` times the mean
/// range of the last `atr_period` bars; exit after `hold_bars`.
#[derive(Debug, Clone)]
pub struct VolatilityBreakout {
    atr_period: usize,
    breakout_mult: f64,
    hold_bars: usize,
    size: f64,
    bars_held: usize,
}

impl VolatilityBreakout {
    pub fn new(atr_period: usize, breakout_mult: f64, hold_bars: usize, size: f64) -> Self {
        Self {
            atr_period,
            breakout_mult,
            hold_bars,
            size,
            bars_held: 0,
        }
    }

    pub fn build(params: &Params) -> Box<dyn Hypothesis> {
        Box::new(Self::new(
            param(params, "atr_period", 10.0) as usize,
            param(params, "breakout_mult", 1.5),
            param(params, "hold_bars", 5.0) as usize,
            param(params, "size", 1.0),
        ))
    }

    /// Mean high-low range over the last `atr_period` bars, current included.
    fn mean_range(&self, market: &MarketView<'_>) -> Option<f64> {
        if market.len() < self.atr_period || self.atr_period == 0 {
            return None;
        }
        let mut sum = 0.0;
        for offset in 0..self.atr_period {
            let bar = market.bar_at(offset).ok()?;
            sum += bar.high - bar.low;
        }
        Some(sum / self.atr_period as f64)
    }
}

impl Hypothesis for VolatilityBreakout {
    fn id(&self) -> HypothesisId {
        HypothesisId::new("volatility_breakout")
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert("atr_period".into(), self.atr_period as f64);
        params.insert("breakout_mult".into(), self.breakout_mult);
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
        let (mean_range, bar) = match (self.mean_range(market), market.current()) {
            (Some(mean_range), Some(bar)) => (mean_range, bar),
            _ => return TradeIntent::hold(now),
        };

        if bar.high - bar.low > mean_range * self.breakout_mult {
            TradeIntent::new(IntentKind::Buy, self.size, now)
        } else {
            TradeIntent::hold(now)
        }
    }
}
