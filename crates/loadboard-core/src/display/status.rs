//! One-line confirmations for finished operations.

use std::fmt;

use crate::processor::BatchOutcome;

/// A success or error line, prefixed `Success:` or `Error:`.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }

    /// Summarises a finished batch the way its terminal event does.
    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        let progress = outcome.progress;
        if outcome.succeeded() {
            Self::success(format!(
                "{} finished: {} of {} orders succeeded",
                capitalize(outcome.action.as_str()),
                progress.completed,
                progress.total
            ))
        } else {
            Self::failure(crate::processor::failure_message(
                outcome.action,
                progress.failed,
            ))
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.success { "Success:" } else { "Error:" };
        writeln!(f, "{prefix} {}", self.message)
    }
}
