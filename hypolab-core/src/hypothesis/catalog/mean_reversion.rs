//! Mean reversion — buy dips below the moving average, exit on reversion.

use super::param;
use crate::clock::ClockRead;
use crate::domain::{HypothesisId, IntentKind, Params, PositionView, TradeIntent};
use crate::hypothesis::Hypothesis;
use crate::market::MarketView;

/// Buy when price drops `threshold` below the `lookback`-bar SMA; close when
/// price reverts above the SMA or after `max_hold` bars, whichever first.
#[derive(Debug, Clone)]
pub struct MeanReversion {
    lookback: usize,
    threshold: f64,
    max_hold: usize,
    size: f64,
    bars_held: usize,
}

impl MeanReversion {
    pub fn new(lookback: usize, threshold: f64, max_hold: usize, size: f64) -> Self {
        Self {
            lookback,
            threshold,
            max_hold,
            size,
            bars_held: 0,
        }
    }

    pub fn build(params: &Params) -> Box<dyn Hypothesis> {
        Box::new(Self::new(
            param(params, "lookback", 10.0) as usize,
            param(params, "threshold", 0.02),
            param(params, "max_hold", 5.0) as usize,
            param(params, "size", 1.0),
        ))
    }

    /// SMA of the last `lookback` closes, current bar included.
    fn sma(&self, market: &MarketView<'_>) -> Option<f64> {
        if market.len() < self.lookback || self.lookback == 0 {
            return None;
        }
        let mut sum = 0.0;
        for offset in 0..self.lookback {
            sum += market.price_at(offset).ok()?;
        }
        Some(sum / self.lookback as f64)
    }
}

impl Hypothesis for MeanReversion {
    fn id(&self) -> HypothesisId {
        HypothesisId::new("mean_reversion")
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert("lookback".into(), self.lookback as f64);
        params.insert("threshold".into(), self.threshold);
        params.insert("max_hold".into(), self.max_hold as f64);
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

        let (sma, current) = match (self.sma(market), market.current()) {
            (Some(sma), Some(bar)) if sma > 0.0 => (sma, bar.close),
            _ => return TradeIntent::hold(now),
        };
        let deviation = (current - sma) / sma;

        if position.has_position() {
            self.bars_held += 1;
            if self.bars_held >= self.max_hold || deviation > 0.0 {
                self.bars_held = 0;
                return TradeIntent::new(IntentKind::Close, self.size, now);
            }
            return TradeIntent::hold(now);
        }

        self.bars_held = 0;
        if deviation < -self.threshold {
            TradeIntent::new(IntentKind::Buy, self.size, now)
        } else {
            TradeIntent::hold(now)
        }
    }
}
