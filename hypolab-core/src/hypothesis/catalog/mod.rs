//! Built-in hypothesis catalog.

pub mod always_long;
pub mod mean_reversion;
pub mod simple_momentum;
pub mod volatility_breakout;

pub use always_long::AlwaysLong;
pub use mean_reversion::MeanReversion;
pub use simple_momentum::SimpleMomentum;
pub use volatility_breakout::VolatilityBreakout;

use crate::domain::Params;

/// Look up a numeric parameter with a default.
pub(crate) fn param(params: &Params, key: &str, default: f64) -> f64 {
    params.get(key).copied().unwrap_or(default)
}
