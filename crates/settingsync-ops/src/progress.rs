//! Progress and result types for batch execution.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use settingsync_core::{Action, RelativePath};

use crate::OperationError;

/// Progress information for an ongoing batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Number of actions finished, successfully or not.
    pub completed: usize,
    /// Number of finished actions that failed.
    pub failed: usize,
    /// Total number of actions in the batch.
    pub total: usize,
    /// Total bytes copied so far.
    pub bytes_copied: u64,
    /// The path whose action finished most recently.
    pub last_path: Option<RelativePath>,
}

impl BatchProgress {
    /// Create a new progress tracker for a batch.
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            failed: 0,
            total,
            bytes_copied: 0,
            last_path: None,
        }
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.completed as f64 / self.total as f64) * 100.0
        } else {
            100.0
        }
    }

    /// Record a finished action.
    pub fn record(&mut self, outcome: &ActionOutcome) {
        self.completed += 1;
        match &outcome.result {
            Ok(bytes) => self.bytes_copied += bytes,
            Err(_) => self.failed += 1,
        }
        self.last_path = Some(outcome.action.relative_path.clone());
    }
}

/// The result of one action in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    /// The action that was executed.
    pub action: Action,
    /// Bytes copied on success.
    pub result: Result<u64, OperationError>,
}

impl ActionOutcome {
    /// Whether the action succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a completed batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// One outcome per submitted action, in submission order.
    pub outcomes: Vec<ActionOutcome>,
    /// Total bytes copied.
    pub bytes_copied: u64,
    /// Wall-clock duration of the batch.
    pub duration: Duration,
}

impl BatchReport {
    /// Number of actions that succeeded.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of actions that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Check if every action succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ActionOutcome::is_success)
    }

    /// Iterate over failed actions with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Action, &OperationError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.action, e)))
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        if self.failed() == 0 {
            format!("Applied {} actions", self.succeeded())
        } else {
            format!(
                "Applied {} actions, {} failed",
                self.succeeded(),
                self.failed()
            )
        }
    }

    /// Convert into an error if any action failed. The error keeps the full report.
    pub fn into_result(self) -> Result<Self, BatchFailed> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(BatchFailed { report: self })
        }
    }
}

/// A batch in which at least one action failed.
#[derive(Debug, Error)]
#[error("{} of {} actions failed", .report.failed(), .report.outcomes.len())]
pub struct BatchFailed {
    /// Every outcome, including the successful ones.
    pub report: BatchReport,
}
