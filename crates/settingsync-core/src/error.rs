//! Error and warning types for reconciliation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Errors that can occur while diffing or reconciling two trees.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Illegal action index or an action that is not legal for a record.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl SyncError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::NotADirectory { .. } | Self::Io { .. } => ErrorKind::Io,
            Self::InvalidState { .. } | Self::InvalidConfig { .. } => ErrorKind::InvalidState,
        }
    }
}

/// Coarse classification of a failure, carried by serialisable reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    Io,
    InvalidState,
}

impl From<std::io::ErrorKind> for ErrorKind {
    fn from(kind: std::io::ErrorKind) -> Self {
        match kind {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Not found"),
            Self::PermissionDenied => write!(f, "Permission denied"),
            Self::Io => write!(f, "I/O error"),
            Self::InvalidState => write!(f, "Invalid state"),
        }
    }
}

/// Kind of non-fatal warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a directory.
    ReadError,
    /// Symbolic link was not followed.
    SkippedSymlink,
    /// Entry name is not valid UTF-8.
    InvalidName,
    /// Two files could not be compared; they are reported as different.
    CompareFailed,
}

/// Non-fatal warning encountered while walking or comparing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl SyncWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a directory that could not be listed.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        let kind = if error.kind() == std::io::ErrorKind::PermissionDenied {
            WarningKind::PermissionDenied
        } else {
            WarningKind::ReadError
        };
        Self {
            message: format!("Failed to enumerate {}: {error}", path.display()),
            path,
            kind,
        }
    }

    /// Create a skipped symlink warning.
    pub fn skipped_symlink(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Skipped symlink: {}", path.display()),
            path,
            kind: WarningKind::SkippedSymlink,
        }
    }

    /// Create a warning for an entry whose name is not valid UTF-8.
    pub fn invalid_name(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Skipped entry with non UTF-8 name: {}", path.display()),
            path,
            kind: WarningKind::InvalidName,
        }
    }

    /// Create a warning for a comparison that could not be completed.
    pub fn compare_failed(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Could not compare {}: {error}", path.display()),
            path,
            kind: WarningKind::CompareFailed,
        }
    }
}

impl std::fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_io() {
        let err = SyncError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, SyncError::PermissionDenied { .. }));
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err = SyncError::io("/test/path", std::io::Error::other("boom"));
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn test_read_error_warning_kind() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let warning = SyncWarning::read_error("/locked", &denied);
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert!(warning.message.contains("/locked"));

        let other = std::io::Error::other("bad sector");
        assert_eq!(
            SyncWarning::read_error("/bad", &other).kind,
            WarningKind::ReadError
        );
    }

    #[test]
    fn test_warning_kind_display() {
        assert_eq!(WarningKind::SkippedSymlink.to_string(), "skipped-symlink");
        assert_eq!(WarningKind::CompareFailed.to_string(), "compare-failed");
    }
}
