//! Clock — single source of simulated time.
//!
//! The clock is advanced only by the replay engine as it walks the bar
//! sequence. No component reads wall-clock time; everything downstream of
//! the engine sees time exclusively through this type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from clock advancement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("time cannot go backwards or repeat: {current} -> {attempted}")]
    NonMonotonicTime {
        current: NaiveDateTime,
        attempted: NaiveDateTime,
    },
}

/// Monotonic simulated clock. Unset until the first advance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    current: Option<NaiveDateTime>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated timestamp, or `None` before the first advance.
    pub fn now(&self) -> Option<NaiveDateTime> {
        self.current
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    /// Advance to `t`. Each advance must strictly increase the value.
    ///
    /// Only the replay engine calls this; the `pub(crate)` visibility is the
    /// single-writer rule made structural.
    pub(crate) fn advance(&mut self, t: NaiveDateTime) -> Result<(), ClockError> {
        if let Some(current) = self.current {
            if t <= current {
                return Err(ClockError::NonMonotonicTime {
                    current,
                    attempted: t,
                });
            }
        }
        self.current = Some(t);
        Ok(())
    }

    /// Read-only view for hypotheses.
    pub fn read(&self) -> ClockRead<'_> {
        ClockRead { clock: self }
    }
}

/// Read-only window onto the [`Clock`].
#[derive(Debug, Clone, Copy)]
pub struct ClockRead<'a> {
    clock: &'a Clock,
}

impl ClockRead<'_> {
    pub fn now(&self) -> Option<NaiveDateTime> {
        self.clock.now()
    }

    pub fn is_set(&self) -> bool {
        self.clock.is_set()
    }
}
