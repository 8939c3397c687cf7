//! Per-action error type.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use settingsync_core::ErrorKind;

/// An error that occurred while executing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// The path that caused the error.
    pub path: PathBuf,
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(path: impl Into<PathBuf>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Create an error from an I/O failure at `path`.
    pub fn io(path: impl Into<PathBuf>, context: &str, error: &std::io::Error) -> Self {
        Self::new(path, error.kind().into(), format!("{context}: {error}"))
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for OperationError {}
