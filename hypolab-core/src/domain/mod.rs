//! Domain types: bars, intents, positions, trades, identities.

pub mod bar;
pub mod ids;
pub mod intent;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use ids::{HypothesisId, Params, ParamsHash};
pub use intent::{IntentKind, TradeIntent};
pub use position::{Position, PositionError, PositionSide, PositionState, PositionView};
pub use trade::CompletedTrade;
