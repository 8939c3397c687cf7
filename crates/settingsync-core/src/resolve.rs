//! Action resolution: a pure mapping from a record and a priority to actions.

use std::sync::Arc;

use crate::action::{Action, ActionKind, Priority, RootPair};
use crate::path::RelativePath;
use crate::record::{DiffRecord, Presence};

/// Recommended action kinds for a presence under a priority.
///
/// `RightWins` is the mirror image of `LeftWins`. Identical files get no
/// actions. `DeleteBoth` and `Skip` are never proposed.
pub fn candidate_kinds(presence: Presence, priority: Priority) -> Vec<ActionKind> {
    match priority {
        Priority::LeftWins => match presence {
            Presence::LeftOnly => vec![ActionKind::CopyToRight],
            Presence::RightOnly => vec![ActionKind::DeleteRight],
            Presence::Both {
                content_equal: false,
            } => vec![ActionKind::CopyToRight],
            Presence::Both {
                content_equal: true,
            } => Vec::new(),
        },
        Priority::RightWins => candidate_kinds(presence.swapped(), Priority::LeftWins)
            .into_iter()
            .map(|kind| kind.mirrored())
            .collect(),
    }
}

/// Candidate actions for a record, recommended first.
pub fn resolve(record: &DiffRecord, priority: Priority) -> Vec<Action> {
    resolve_presence(
        record.relative_path(),
        record.presence(),
        record.roots(),
        priority,
    )
}

pub(crate) fn resolve_presence(
    relative_path: &RelativePath,
    presence: Presence,
    roots: &Arc<RootPair>,
    priority: Priority,
) -> Vec<Action> {
    candidate_kinds(presence, priority)
        .into_iter()
        .map(|kind| Action::new(kind, relative_path.clone(), Arc::clone(roots)))
        .collect()
}
