//! One-line textual rendering of a diff record and a chosen action.

use std::path::{Path, PathBuf};

use settingsync_core::{ActionKind, DiffRecord, SyncError};

/// Render `record` with its candidate action at `action_index`.
///
/// ```text
/// /live/settings.json --> /backup/settings.json
/// /live/snippets <-- /backup/snippets/go.json
/// /live/old.jsonX
///     X/backup/stale.json
/// /live/a.jsonX   X/backup/a.json
/// /live/a.json-| |-/backup/a.json
/// /live/a.json === /backup/a.json
/// ```
///
/// When a copy creates a new file, the destination directory is shown
/// instead of the (not yet existing) destination file. Records without
/// actions render as identical regardless of the index.
pub fn render(record: &DiffRecord, action_index: usize) -> Result<String, SyncError> {
    let roots = record.roots();
    let left_file = record.relative_path().under(&roots.left);
    let right_file = record.relative_path().under(&roots.right);
    let left = record.left_present().then(|| left_file.clone());
    let right = record.right_present().then(|| right_file.clone());

    if record.candidate_actions().is_empty() {
        return Ok(format!("{} === {}", show(left.as_deref()), show(right.as_deref())));
    }

    let line = match record.action(action_index)?.kind {
        ActionKind::CopyToLeft => {
            let dest = if record.is_right_only() {
                parent_of(&left_file)
            } else {
                left_file
            };
            format!("{} <-- {}", dest.display(), show(right.as_deref()))
        }
        ActionKind::CopyToRight => {
            let dest = if record.is_left_only() {
                parent_of(&right_file)
            } else {
                right_file
            };
            format!("{} --> {}", show(left.as_deref()), dest.display())
        }
        ActionKind::DeleteLeft => format!("{}X    ", show(left.as_deref())),
        ActionKind::DeleteRight => format!("    X{}", show(right.as_deref())),
        ActionKind::DeleteBoth => format!("{}X   X{}", show(left.as_deref()), show(right.as_deref())),
        ActionKind::Skip => format!("{}-| |-{}", show(left.as_deref()), show(right.as_deref())),
    };
    Ok(line)
}

fn show(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

fn parent_of(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use settingsync_core::{Presence, Priority, RelativePath, RootPair};

    fn record(path: &str, presence: Presence, priority: Priority) -> DiffRecord {
        DiffRecord::new(
            RelativePath::new(path).unwrap(),
            presence,
            Arc::new(RootPair::new("/live", "/backup")),
            priority,
        )
    }

    #[test]
    fn test_copy_right_new_file_shows_directory() {
        let rec = record("snippets/go.json", Presence::LeftOnly, Priority::LeftWins);
        assert_eq!(
            render(&rec, 0).unwrap(),
            "/live/snippets/go.json --> /backup/snippets"
        );
    }

    #[test]
    fn test_copy_left_existing_file() {
        let rec = record(
            "settings.json",
            Presence::Both {
                content_equal: false,
            },
            Priority::RightWins,
        );
        assert_eq!(
            render(&rec, 0).unwrap(),
            "/live/settings.json <-- /backup/settings.json"
        );
    }

    #[test]
    fn test_delete_right() {
        let rec = record("stale.json", Presence::RightOnly, Priority::LeftWins);
        assert_eq!(render(&rec, 0).unwrap(), "    X/backup/stale.json");
    }

    #[test]
    fn test_selected_alternates() {
        let mut rec = record(
            "a.json",
            Presence::Both {
                content_equal: false,
            },
            Priority::LeftWins,
        );
        rec.select(ActionKind::DeleteBoth).unwrap();
        assert_eq!(render(&rec, 0).unwrap(), "/live/a.jsonX   X/backup/a.json");

        rec.select(ActionKind::Skip).unwrap();
        assert_eq!(render(&rec, 0).unwrap(), "/live/a.json-| |-/backup/a.json");
    }

    #[test]
    fn test_identical() {
        let rec = record(
            "a.json",
            Presence::Both {
                content_equal: true,
            },
            Priority::LeftWins,
        );
        assert_eq!(render(&rec, 3).unwrap(), "/live/a.json === /backup/a.json");
    }

    #[test]
    fn test_illegal_index() {
        let rec = record("a.json", Presence::LeftOnly, Priority::LeftWins);
        assert!(matches!(
            render(&rec, 1),
            Err(SyncError::InvalidState { .. })
        ));
    }
}
