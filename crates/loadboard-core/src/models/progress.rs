//! Progress counters for a running batch operation.

use serde::{Deserialize, Serialize};

/// Running counters of a batch operation, as carried by progress and success
/// notifications.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    pub is_complete: bool,
}

impl Progress {
    /// Fresh counters for a batch of `total` records.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Records attempted so far, successful or not.
    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }

    /// Records not attempted yet.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed())
    }

    /// Share of processed records, in percent.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.processed() * 100) / self.total).min(100) as u8
    }

    /// The terminal copy of these counters.
    pub fn finished(self) -> Self {
        Self {
            is_complete: true,
            ..self
        }
    }
}
