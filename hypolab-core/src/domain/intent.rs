//! TradeIntent — a requested action prior to execution.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// What a hypothesis wants done with the (single) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    /// Open a long position.
    Buy,
    /// Exit the open position. Equivalent to `Close` for a long-only book;
    /// never opens a short.
    Sell,
    /// Exit the open position.
    Close,
    /// Do nothing. Never enqueued.
    Hold,
}

impl IntentKind {
    pub fn is_hold(&self) -> bool {
        matches!(self, IntentKind::Hold)
    }

    /// Whether this intent exits rather than enters.
    pub fn is_exit(&self) -> bool {
        matches!(self, IntentKind::Sell | IntentKind::Close)
    }
}

/// Immutable decision emitted by a hypothesis.
///
/// `decided_at` is the simulated timestamp of the bar on which the decision
/// was made — never a wall-clock read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub kind: IntentKind,
    pub size: f64,
    pub decided_at: NaiveDateTime,
}

impl TradeIntent {
    pub fn new(kind: IntentKind, size: f64, decided_at: NaiveDateTime) -> Self {
        Self {
            kind,
            size,
            decided_at,
        }
    }

    pub fn hold(decided_at: NaiveDateTime) -> Self {
        Self::new(IntentKind::Hold, 0.0, decided_at)
    }

    pub fn is_hold(&self) -> bool {
        self.kind.is_hold()
    }
}
