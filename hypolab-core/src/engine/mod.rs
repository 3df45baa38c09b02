//! Replay engine: the bar-by-bar temporal-causality loop.

pub mod observer;
pub mod replay;

pub use observer::{EquityCollector, StepEvent, StepObserver};
pub use replay::{BarSource, CancelToken, ReplayEngine, ReplayError, ReplaySummary, RunStatus};
