//! Reconciliation actions and priorities.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::SyncError;
use crate::path::RelativePath;

/// The two directory trees being reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootPair {
    /// Left root (e.g. the live settings directory).
    pub left: PathBuf,
    /// Right root (e.g. the backup repository).
    pub right: PathBuf,
}

impl RootPair {
    /// Create a new root pair.
    pub fn new(left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Which side's content wins when the trees disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum Priority {
    /// Left is the source of truth: copy left to right, delete right-only files.
    #[default]
    LeftWins,
    /// Right is the source of truth: copy right to left.
    RightWins,
}

impl FromStr for Priority {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "left-wins" | "leftwins" => Ok(Self::LeftWins),
            "right" | "right-wins" | "rightwins" => Ok(Self::RightWins),
            other => Err(SyncError::InvalidConfig {
                message: format!("unknown priority: {other}"),
            }),
        }
    }
}

/// The kind of a single reconciliation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum ActionKind {
    /// Copy the left file over the right one.
    #[strum(to_string = "copy to right")]
    CopyToRight,
    /// Copy the right file over the left one.
    #[strum(to_string = "copy to left")]
    CopyToLeft,
    /// Delete the left file.
    #[strum(to_string = "delete left")]
    DeleteLeft,
    /// Delete the right file.
    #[strum(to_string = "delete right")]
    DeleteRight,
    /// Delete the file on both sides.
    #[strum(to_string = "delete both")]
    DeleteBoth,
    /// Leave both sides untouched.
    #[strum(to_string = "skip")]
    Skip,
}

impl ActionKind {
    /// Whether this action can be applied to a record with the given presence flags.
    pub fn is_legal(&self, left_present: bool, right_present: bool) -> bool {
        match self {
            Self::CopyToRight | Self::DeleteLeft => left_present,
            Self::CopyToLeft | Self::DeleteRight => right_present,
            Self::DeleteBoth => left_present && right_present,
            Self::Skip => true,
        }
    }

    /// The same action with left and right exchanged.
    pub fn mirrored(&self) -> Self {
        match self {
            Self::CopyToRight => Self::CopyToLeft,
            Self::CopyToLeft => Self::CopyToRight,
            Self::DeleteLeft => Self::DeleteRight,
            Self::DeleteRight => Self::DeleteLeft,
            Self::DeleteBoth => Self::DeleteBoth,
            Self::Skip => Self::Skip,
        }
    }
}

/// A single action against one relative path.
///
/// Absolute paths are derived from the shared roots on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// What to do.
    pub kind: ActionKind,
    /// The path the action applies to.
    pub relative_path: RelativePath,
    /// The trees the path is resolved against.
    pub roots: Arc<RootPair>,
}

impl Action {
    /// Create a new action.
    pub fn new(kind: ActionKind, relative_path: RelativePath, roots: Arc<RootPair>) -> Self {
        Self {
            kind,
            relative_path,
            roots,
        }
    }

    /// Absolute path of the file under the left root.
    pub fn left_path(&self) -> PathBuf {
        self.relative_path.under(&self.roots.left)
    }

    /// Absolute path of the file under the right root.
    pub fn right_path(&self) -> PathBuf {
        self.relative_path.under(&self.roots.right)
    }

    /// Source of a copy action.
    pub fn source(&self) -> Option<PathBuf> {
        match self.kind {
            ActionKind::CopyToRight => Some(self.left_path()),
            ActionKind::CopyToLeft => Some(self.right_path()),
            _ => None,
        }
    }

    /// Destination of a copy action.
    pub fn destination(&self) -> Option<PathBuf> {
        match self.kind {
            ActionKind::CopyToRight => Some(self.right_path()),
            ActionKind::CopyToLeft => Some(self.left_path()),
            _ => None,
        }
    }

    /// Every path this action modifies.
    pub fn targets(&self) -> Vec<PathBuf> {
        match self.kind {
            ActionKind::CopyToRight | ActionKind::DeleteRight => vec![self.right_path()],
            ActionKind::CopyToLeft | ActionKind::DeleteLeft => vec![self.left_path()],
            ActionKind::DeleteBoth => vec![self.left_path(), self.right_path()],
            ActionKind::Skip => Vec::new(),
        }
    }

    /// Path used when reporting on this action.
    pub fn display_path(&self) -> &Path {
        Path::new(self.relative_path.as_str())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.relative_path)
    }
}
