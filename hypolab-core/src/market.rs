//! MarketState — bounded, ordered window of committed bars.
//!
//! The engine appends one bar per step, after the clock has advanced to that
//! bar's timestamp; hypotheses read through [`MarketView`] and therefore can
//! never observe a bar the engine has not committed.

use crate::config::ConfigError;
use crate::domain::Bar;
use std::collections::VecDeque;
use thiserror::Error;

/// Errors from market-state access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error("bar at {attempted} is not after the last stored bar at {last}")]
    OutOfOrderBar {
        last: chrono::NaiveDateTime,
        attempted: chrono::NaiveDateTime,
    },
    #[error("history has {available} bars, offset {offset} is out of range")]
    IndexOutOfRange { offset: usize, available: usize },
}

/// Ordered sequence of the most recent W bars (all, when unbounded).
#[derive(Debug, Clone)]
pub struct MarketState {
    bars: VecDeque<Bar>,
    window: Option<usize>,
}

impl MarketState {
    pub fn new(window: Option<usize>) -> Result<Self, ConfigError> {
        if window == Some(0) {
            return Err(ConfigError::InvalidWindow);
        }
        Ok(Self {
            bars: VecDeque::new(),
            window,
        })
    }

    /// Append a committed bar. Timestamps must strictly increase.
    ///
    /// Engine-only: the replay engine calls this immediately after advancing
    /// the clock to `bar.timestamp`.
    pub(crate) fn append(&mut self, bar: Bar) -> Result<(), MarketError> {
        if let Some(last) = self.bars.back() {
            if bar.timestamp <= last.timestamp {
                return Err(MarketError::OutOfOrderBar {
                    last: last.timestamp,
                    attempted: bar.timestamp,
                });
            }
        }
        self.bars.push_back(bar);
        if let Some(window) = self.window {
            while self.bars.len() > window {
                self.bars.pop_front();
            }
        }
        Ok(())
    }

    /// The most recent bar.
    pub fn current(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// The bar `offset` bars back from the most recent (0 = current).
    pub fn bar_at(&self, offset: usize) -> Result<&Bar, MarketError> {
        let available = self.bars.len();
        if offset >= available {
            return Err(MarketError::IndexOutOfRange { offset, available });
        }
        Ok(&self.bars[available - 1 - offset])
    }

    /// Close price `offset` bars back from the most recent (0 = current).
    pub fn price_at(&self, offset: usize) -> Result<f64, MarketError> {
        self.bar_at(offset).map(|bar| bar.close)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Iterate bars oldest-first.
    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    /// Read-only view for hypotheses.
    pub fn view(&self) -> MarketView<'_> {
        MarketView { state: self }
    }
}

/// Read-only window onto [`MarketState`].
///
/// The only market type a hypothesis ever receives.
#[derive(Debug, Clone, Copy)]
pub struct MarketView<'a> {
    state: &'a MarketState,
}

impl<'a> MarketView<'a> {
    pub fn current(&self) -> Option<&'a Bar> {
        self.state.current()
    }

    pub fn bar_at(&self, offset: usize) -> Result<&'a Bar, MarketError> {
        self.state.bar_at(offset)
    }

    pub fn price_at(&self, offset: usize) -> Result<f64, MarketError> {
        self.state.price_at(offset)
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn bars(&self) -> impl Iterator<Item = &'a Bar> {
        self.state.bars()
    }
}
