//! DecisionQueue — buffers trade intents until their execution delay elapses.
//!
//! The delay (>= 1 bar) is the no-look-ahead guarantee: an intent decided at
//! bar i can never be released at or before bar i.

use crate::config::ConfigError;
use crate::domain::TradeIntent;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A buffered intent with its decision and due bar indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueuedIntent {
    pub intent: TradeIntent,
    pub decision_bar: usize,
    pub due_bar: usize,
}

/// FIFO queue of pending intents, keyed by due bar index.
#[derive(Debug, Clone)]
pub struct DecisionQueue {
    entries: VecDeque<QueuedIntent>,
    delay: usize,
}

impl DecisionQueue {
    pub fn new(delay: usize) -> Result<Self, ConfigError> {
        if delay < 1 {
            return Err(ConfigError::InvalidDelay(delay));
        }
        Ok(Self {
            entries: VecDeque::new(),
            delay,
        })
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Buffer an intent decided at `decision_bar`; it becomes due at
    /// `decision_bar + delay`.
    pub fn enqueue(&mut self, intent: TradeIntent, decision_bar: usize) {
        self.entries.push_back(QueuedIntent {
            intent,
            decision_bar,
            due_bar: decision_bar + self.delay,
        });
    }

    /// Remove and return every entry with `due_bar <= current_bar`, oldest
    /// first. Entries due the same bar are released together in enqueue
    /// order.
    pub fn pop_due(&mut self, current_bar: usize) -> Vec<QueuedIntent> {
        let mut due = Vec::new();
        let mut remaining = VecDeque::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.due_bar <= current_bar {
                due.push(entry);
            } else {
                remaining.push_back(entry);
            }
        }
        self.entries = remaining;
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries still pending, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &QueuedIntent> {
        self.entries.iter()
    }

    /// Drain everything still pending (run termination: these are reported
    /// as unexecuted, never silently discarded).
    pub fn drain_pending(&mut self) -> Vec<QueuedIntent> {
        self.entries.drain(..).collect()
    }
}
