//! Replay engine — sequences clock, market, queue, execution, and decisions
//! bar by bar.
//!
//! Per bar, in order:
//! 1. Cancellation check (the only pre-emption point)
//! 2. Pull the next bar; exhausted source → Completed
//! 3. OHLC sanity check — malformed bars are fatal
//! 4. Advance the clock — non-monotonic time is fatal
//! 5. Commit the bar to market state
//! 6. Release due intents and hand them to the execution collaborator at the
//!    bar's open price
//! 7. Invoke the hypothesis over read-only views
//! 8. Enqueue a non-HOLD intent for `delay` bars later
//! 9. Mark equity at the close and emit a step event
//!
//! The engine owns exactly one clock/market/book/queue; nothing is shared
//! across runs, and the loop is strictly sequential. Identical inputs
//! produce identical trades and equity curves.

use crate::clock::{Clock, ClockError};
use crate::config::{ConfigError, ReplayConfig};
use crate::domain::{Bar, CompletedTrade, PositionState};
use crate::engine::observer::{StepEvent, StepObserver};
use crate::execution::{ExecutionModel, IgnoredIntent};
use crate::hypothesis::Hypothesis;
use crate::market::{MarketError, MarketState};
use crate::queue::{DecisionQueue, QueuedIntent};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Replay run states. Forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Initialized,
    Running,
    Completed,
    Failed,
}

/// Fatal replay errors. Any of these aborts the run (status → Failed).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    #[error("clock error at bar index {index}: {source}")]
    Clock {
        index: usize,
        #[source]
        source: ClockError,
    },
    #[error("market error at bar index {index}: {source}")]
    Market {
        index: usize,
        #[source]
        source: MarketError,
    },
    #[error("malformed bar at index {index} ({timestamp}): OHLC invariant violated")]
    MalformedBar {
        index: usize,
        timestamp: NaiveDateTime,
    },
    #[error("run cancelled at bar index {index}")]
    Cancelled { index: usize },
    #[error("engine is {status:?}; a fresh engine is required for a new run")]
    NotRunnable { status: RunStatus },
}

/// Cooperative cancellation signal, checked at the top of each bar step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// External bar source. Bars must satisfy the OHLC and strictly-increasing
/// timestamp invariants; violations are fatal, not recoverable.
pub trait BarSource {
    fn next_bar(&mut self) -> Option<Bar>;
}

impl<I: Iterator<Item = Bar>> BarSource for I {
    fn next_bar(&mut self) -> Option<Bar> {
        self.next()
    }
}

/// Result of a replay run, partial or complete.
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub status: RunStatus,
    pub bar_count: usize,
    pub initial_capital: f64,
    pub final_equity: f64,
    /// Equity marked at each bar's close.
    pub equity_curve: Vec<f64>,
    pub trades: Vec<CompletedTrade>,
    /// Released intents that resolved to no-ops.
    pub ignored: Vec<IgnoredIntent>,
    /// Intents still pending when the source was exhausted — dropped,
    /// reported, never executed.
    pub unexecuted: Vec<QueuedIntent>,
}

/// The temporal-causality engine: owns one clock, one market window, one
/// position book, and one decision queue for the lifetime of a single run.
pub struct ReplayEngine {
    config: ReplayConfig,
    status: RunStatus,
    clock: Clock,
    market: MarketState,
    book: PositionState,
    queue: DecisionQueue,
    hypothesis: Box<dyn Hypothesis>,
    executor: Box<dyn ExecutionModel>,
    cancel: Option<CancelToken>,

    bar_count: usize,
    equity_curve: Vec<f64>,
    trades: Vec<CompletedTrade>,
    ignored: Vec<IgnoredIntent>,
    unexecuted: Vec<QueuedIntent>,
}

impl ReplayEngine {
    pub fn new(
        config: ReplayConfig,
        hypothesis: Box<dyn Hypothesis>,
        executor: Box<dyn ExecutionModel>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let market = MarketState::new(config.window)?;
        let queue = DecisionQueue::new(config.delay_bars)?;
        let book = PositionState::new(config.initial_capital);
        Ok(Self {
            config,
            status: RunStatus::Initialized,
            clock: Clock::new(),
            market,
            book,
            queue,
            hypothesis,
            executor,
            cancel: None,
            bar_count: 0,
            equity_curve: Vec::new(),
            trades: Vec::new(),
            ignored: Vec::new(),
            unexecuted: Vec::new(),
        })
    }

    /// Attach a cancellation token, checked at the top of each bar step.
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = Some(token);
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn market(&self) -> &MarketState {
        &self.market
    }

    pub fn book(&self) -> &PositionState {
        &self.book
    }

    /// Drive the engine over `source` until exhaustion, cancellation, or a
    /// fatal error.
    ///
    /// On error the engine transitions to Failed; the partial, consistent
    /// result remains available through [`summary`](Self::summary).
    pub fn run(&mut self, source: &mut dyn BarSource) -> Result<ReplaySummary, ReplayError> {
        struct NoopObserver;
        impl StepObserver for NoopObserver {
            fn on_step(&mut self, _event: &StepEvent<'_>) {}
        }
        self.run_with_observer(source, &mut NoopObserver)
    }

    /// Like [`run`](Self::run), emitting every committed step event to
    /// `observer` (metrics, storage, progress).
    pub fn run_with_observer(
        &mut self,
        source: &mut dyn BarSource,
        observer: &mut dyn StepObserver,
    ) -> Result<ReplaySummary, ReplayError> {
        if self.status != RunStatus::Initialized {
            return Err(ReplayError::NotRunnable {
                status: self.status,
            });
        }
        self.status = RunStatus::Running;

        loop {
            if self
                .cancel
                .as_ref()
                .is_some_and(CancelToken::is_cancelled)
            {
                self.status = RunStatus::Failed;
                return Err(ReplayError::Cancelled {
                    index: self.bar_count,
                });
            }

            let Some(bar) = source.next_bar() else {
                break;
            };

            self.step(bar, observer)?;
        }

        // Source exhausted: whatever is still queued will never execute.
        self.unexecuted = self.queue.drain_pending();
        self.status = RunStatus::Completed;
        Ok(self.summary())
    }

    /// Process one bar. Fatal errors mark the run Failed and propagate.
    fn step(&mut self, bar: Bar, observer: &mut dyn StepObserver) -> Result<(), ReplayError> {
        let index = self.bar_count;

        if !bar.is_sane() {
            self.status = RunStatus::Failed;
            return Err(ReplayError::MalformedBar {
                index,
                timestamp: bar.timestamp,
            });
        }

        if let Err(source) = self.clock.advance(bar.timestamp) {
            self.status = RunStatus::Failed;
            return Err(ReplayError::Clock { index, source });
        }

        if let Err(source) = self.market.append(bar.clone()) {
            self.status = RunStatus::Failed;
            return Err(ReplayError::Market { index, source });
        }

        // Release and execute intents that became due this bar, at this
        // bar's open price.
        let due = self.queue.pop_due(index);
        let outcome = self.executor.execute(&due, &bar, index, &mut self.book);

        // Decision pass: read-only views only.
        let intent = self.hypothesis.decide(
            &self.market.view(),
            &self.book.view(),
            &self.clock.read(),
        );
        if !intent.is_hold() {
            self.queue.enqueue(intent, index);
        }

        // Commit step results and notify the observer.
        let equity = self.book.total_capital(bar.close);
        self.equity_curve.push(equity);
        observer.on_step(&StepEvent {
            bar_index: index,
            bar: &bar,
            equity,
            trades: &outcome.trades,
            ignored: &outcome.ignored,
        });

        self.trades.extend(outcome.trades);
        self.ignored.extend(outcome.ignored);
        self.bar_count += 1;
        Ok(())
    }

    /// Snapshot of everything committed so far. Consistent at any point,
    /// including after a failed or cancelled run.
    pub fn summary(&self) -> ReplaySummary {
        ReplaySummary {
            status: self.status,
            bar_count: self.bar_count,
            initial_capital: self.config.initial_capital,
            final_equity: self
                .equity_curve
                .last()
                .copied()
                .unwrap_or(self.config.initial_capital),
            equity_curve: self.equity_curve.clone(),
            trades: self.trades.clone(),
            ignored: self.ignored.clone(),
            unexecuted: self.unexecuted.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IntentKind, Params};
    use crate::execution::NextBarOpenExecutor;
    use crate::hypothesis::catalog::AlwaysLong;
    use chrono::NaiveDate;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.5,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    fn engine(delay: usize) -> ReplayEngine {
        let config = ReplayConfig::new(delay, None, 100_000.0);
        ReplayEngine::new(
            config,
            Box::new(AlwaysLong::new(1.0)),
            Box::new(NextBarOpenExecutor::frictionless()),
        )
        .unwrap()
    }

    #[test]
    fn empty_source_completes() {
        let mut engine = engine(1);
        let summary = engine.run(&mut std::iter::empty::<Bar>()).unwrap();
        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.bar_count, 0);
        assert_eq!(summary.final_equity, 100_000.0);
    }

    #[test]
    fn completed_engine_cannot_rerun() {
        let mut engine = engine(1);
        engine.run(&mut std::iter::empty::<Bar>()).unwrap();
        let err = engine.run(&mut std::iter::empty::<Bar>()).unwrap_err();
        assert_eq!(
            err,
            ReplayError::NotRunnable {
                status: RunStatus::Completed
            }
        );
    }

    #[test]
    fn malformed_bar_is_fatal() {
        let mut engine = engine(1);
        let mut series = bars(&[100.0, 101.0]);
        series[1].high = series[1].low - 1.0;
        let err = engine.run(&mut series.into_iter()).unwrap_err();
        assert!(matches!(err, ReplayError::MalformedBar { index: 1, .. }));
        assert_eq!(engine.status(), RunStatus::Failed);
        // The partial summary covers the bars committed before the failure.
        assert_eq!(engine.summary().bar_count, 1);
    }

    #[test]
    fn out_of_order_bar_is_fatal() {
        let mut engine = engine(1);
        let mut series = bars(&[100.0, 101.0, 102.0]);
        series[2].timestamp = series[0].timestamp;
        let err = engine.run(&mut series.into_iter()).unwrap_err();
        assert!(matches!(err, ReplayError::Clock { index: 2, .. }));
        assert_eq!(engine.status(), RunStatus::Failed);
    }

    #[test]
    fn cancellation_aborts_cleanly() {
        let mut engine = engine(1);
        let token = CancelToken::new();
        engine.set_cancel_token(token.clone());
        token.cancel();
        let err = engine.run(&mut bars(&[100.0, 101.0]).into_iter()).unwrap_err();
        assert_eq!(err, ReplayError::Cancelled { index: 0 });
        assert_eq!(engine.status(), RunStatus::Failed);
        assert_eq!(engine.summary().bar_count, 0);
    }

    #[test]
    fn pending_intents_reported_unexecuted() {
        // Delay 3 over 2 bars: the BUY decided at bar 0 never comes due.
        let mut engine = engine(3);
        let summary = engine.run(&mut bars(&[100.0, 101.0]).into_iter()).unwrap();
        assert!(summary.trades.is_empty());
        assert_eq!(summary.unexecuted.len(), 1);
        assert_eq!(summary.unexecuted[0].intent.kind, IntentKind::Buy);
        assert_eq!(summary.unexecuted[0].due_bar, 3);
    }

    #[test]
    fn equity_curve_tracks_every_bar() {
        let mut engine = engine(1);
        let summary = engine
            .run(&mut bars(&[100.0, 101.0, 102.0, 103.0]).into_iter())
            .unwrap();
        assert_eq!(summary.equity_curve.len(), 4);
        // Bar 0: flat, equity unchanged.
        assert_eq!(summary.equity_curve[0], 100_000.0);
    }

    #[test]
    fn hypothesis_params_flow_through_registry_ctor() {
        // Construction sanity for the boxed path used by the engine.
        let hypothesis = AlwaysLong::build(&Params::new());
        assert_eq!(hypothesis.id().as_str(), "always_long");
    }
}
