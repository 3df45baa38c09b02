//! Hypothesis status — closed enumeration with an explicit transition
//! validator.
//!
//! Transitions are forward-only. A decayed hypothesis never reverts; it
//! comes back only as a brand-new record under explicit re-registration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HypothesisStatus {
    Draft,
    Evaluated,
    Promoted,
    /// Manually paused. Terminal.
    Frozen,
    /// Manually withdrawn. Terminal.
    Retired,
    /// Automatically retired by the decay monitor. Terminal.
    Decayed,
}

impl HypothesisStatus {
    /// Whether `self → next` is a legal lifecycle transition.
    ///
    /// `Evaluated → Evaluated` is the single self-transition: a fresh
    /// evaluation of a not-yet-promoted hypothesis replaces its summary.
    pub fn can_transition(self, next: HypothesisStatus) -> bool {
        use HypothesisStatus::*;
        matches!(
            (self, next),
            (Draft, Evaluated)
                | (Evaluated, Evaluated)
                | (Evaluated, Promoted)
                | (Promoted, Frozen)
                | (Promoted, Retired)
                | (Promoted, Decayed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            HypothesisStatus::Frozen | HypothesisStatus::Retired | HypothesisStatus::Decayed
        )
    }
}

/// Errors from lifecycle mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("illegal lifecycle transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: HypothesisStatus,
        to: HypothesisStatus,
    },
    #[error("shadow windows can only be recorded for a promoted (or decayed) hypothesis, status is {status:?}")]
    NotPromoted { status: HypothesisStatus },
}

/// Validate a transition, returning the new status or an error.
pub fn transition(
    from: HypothesisStatus,
    to: HypothesisStatus,
) -> Result<HypothesisStatus, LifecycleError> {
    if from.can_transition(to) {
        Ok(to)
    } else {
        Err(LifecycleError::IllegalTransition { from, to })
    }
}
