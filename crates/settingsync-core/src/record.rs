//! Diff records: one per relative path where the trees disagree.

use std::sync::Arc;

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::action::{Action, ActionKind, Priority, RootPair};
use crate::error::SyncError;
use crate::path::RelativePath;
use crate::resolve::resolve_presence;

/// Where a relative path exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Presence {
    LeftOnly,
    RightOnly,
    Both { content_equal: bool },
}

impl Presence {
    /// Build a presence from raw flags. Fails if neither side is present.
    pub fn from_flags(
        left_present: bool,
        right_present: bool,
        content_equal: bool,
    ) -> Result<Self, SyncError> {
        match (left_present, right_present) {
            (true, true) => Ok(Self::Both { content_equal }),
            (true, false) => Ok(Self::LeftOnly),
            (false, true) => Ok(Self::RightOnly),
            (false, false) => Err(SyncError::invalid_state(
                "a diff record needs at least one present side",
            )),
        }
    }

    pub fn left_present(&self) -> bool {
        !matches!(self, Self::RightOnly)
    }

    pub fn right_present(&self) -> bool {
        !matches!(self, Self::LeftOnly)
    }

    /// True only when both sides are present with identical content.
    pub fn content_equal(&self) -> bool {
        matches!(self, Self::Both { content_equal: true })
    }

    /// The presence seen from the other side.
    pub fn swapped(&self) -> Self {
        match self {
            Self::LeftOnly => Self::RightOnly,
            Self::RightOnly => Self::LeftOnly,
            both => *both,
        }
    }
}

/// A relative path where the two trees disagree (or, optionally, agree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    relative_path: RelativePath,
    presence: Presence,
    #[serde(skip)]
    roots: Arc<RootPair>,
    candidate_actions: Vec<Action>,
}

impl DiffRecord {
    /// Create a record and resolve its candidate actions for `priority`.
    pub fn new(
        relative_path: RelativePath,
        presence: Presence,
        roots: Arc<RootPair>,
        priority: Priority,
    ) -> Self {
        let candidate_actions = resolve_presence(&relative_path, presence, &roots, priority);
        Self {
            relative_path,
            presence,
            roots,
            candidate_actions,
        }
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn roots(&self) -> &Arc<RootPair> {
        &self.roots
    }

    pub fn left_present(&self) -> bool {
        self.presence.left_present()
    }

    pub fn right_present(&self) -> bool {
        self.presence.right_present()
    }

    pub fn content_equal(&self) -> bool {
        self.presence.content_equal()
    }

    pub fn is_left_only(&self) -> bool {
        self.presence == Presence::LeftOnly
    }

    pub fn is_right_only(&self) -> bool {
        self.presence == Presence::RightOnly
    }

    pub fn is_both(&self) -> bool {
        matches!(self.presence, Presence::Both { .. })
    }

    /// Candidate actions; index 0 is the recommended one.
    pub fn candidate_actions(&self) -> &[Action] {
        &self.candidate_actions
    }

    /// The recommended action, or `None` for identical files.
    pub fn default_action(&self) -> Option<&Action> {
        self.candidate_actions.first()
    }

    /// The candidate action at `index`.
    pub fn action(&self, index: usize) -> Result<&Action, SyncError> {
        self.candidate_actions.get(index).ok_or_else(|| {
            SyncError::invalid_state(format!(
                "illegal action index {index} for {} ({} candidates)",
                self.relative_path,
                self.candidate_actions.len()
            ))
        })
    }

    /// Every action a caller may choose for this record, recommended first.
    pub fn alternatives(&self) -> Vec<ActionKind> {
        let Some(default) = self.default_action().map(|a| a.kind) else {
            return Vec::new();
        };
        std::iter::once(default)
            .chain(ActionKind::iter().filter(|kind| {
                *kind != default && kind.is_legal(self.left_present(), self.right_present())
            }))
            .collect()
    }

    /// Override the recommendation with one of [`alternatives`](Self::alternatives).
    pub fn select(&mut self, kind: ActionKind) -> Result<&Action, SyncError> {
        if !self.alternatives().contains(&kind) {
            return Err(SyncError::invalid_state(format!(
                "{kind} is not applicable to {}",
                self.relative_path
            )));
        }
        self.candidate_actions.retain(|action| action.kind != kind);
        self.candidate_actions.insert(
            0,
            Action::new(kind, self.relative_path.clone(), Arc::clone(&self.roots)),
        );
        Ok(&self.candidate_actions[0])
    }

    /// Recompute the candidate actions for a different priority.
    pub fn reprioritize(&mut self, priority: Priority) {
        self.candidate_actions =
            resolve_presence(&self.relative_path, self.presence, &self.roots, priority);
    }
}
