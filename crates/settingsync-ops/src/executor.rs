//! Executes a single action against a filesystem.

use std::path::Path;

use tracing::debug;

use settingsync_core::{Action, ActionKind, ErrorKind, FileSystem};

use crate::OperationError;

/// Execute one action, returning the number of bytes copied.
///
/// Copies create any missing destination directories and overwrite an
/// existing destination. Deletes leave emptied parent directories in place.
/// `DeleteBoth` attempts both sides even if the first fails and does not
/// restore a side that was already removed.
pub fn execute<F: FileSystem + ?Sized>(fs: &F, action: &Action) -> Result<u64, OperationError> {
    debug!(action = %action.kind, path = %action.relative_path, "executing");

    match action.kind {
        ActionKind::CopyToRight => copy(fs, &action.left_path(), &action.right_path()),
        ActionKind::CopyToLeft => copy(fs, &action.right_path(), &action.left_path()),
        ActionKind::DeleteLeft => delete(fs, &action.left_path()).map(|_| 0),
        ActionKind::DeleteRight => delete(fs, &action.right_path()).map(|_| 0),
        ActionKind::DeleteBoth => delete_both(fs, &action.left_path(), &action.right_path()),
        ActionKind::Skip => Ok(0),
    }
}

fn copy<F: FileSystem + ?Sized>(fs: &F, source: &Path, dest: &Path) -> Result<u64, OperationError> {
    // A missing source must not leave new directories behind
    if !fs.exists(source) {
        return Err(OperationError::new(
            source,
            ErrorKind::NotFound,
            "Source file no longer exists",
        ));
    }
    if let Some(parent) = dest.parent() {
        fs.create_dir_all(parent)
            .map_err(|e| OperationError::io(parent, "Failed to create directory", &e))?;
    }
    fs.copy_file(source, dest)
        .map_err(|e| OperationError::io(dest, "Failed to copy", &e))
}

fn delete<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<(), OperationError> {
    fs.remove_file(path)
        .map_err(|e| OperationError::io(path, "Failed to delete", &e))
}

fn delete_both<F: FileSystem + ?Sized>(
    fs: &F,
    left: &Path,
    right: &Path,
) -> Result<u64, OperationError> {
    let errors: Vec<OperationError> = [delete(fs, left), delete(fs, right)]
        .into_iter()
        .filter_map(Result::err)
        .collect();

    match errors.as_slice() {
        [] => Ok(0),
        [single] => Err(single.clone()),
        [first, ..] => Err(OperationError::new(
            first.path.clone(),
            if errors.iter().all(|e| e.kind == first.kind) {
                first.kind
            } else {
                ErrorKind::Io
            },
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use settingsync_core::{MemoryFileSystem, RelativePath, RootPair};

    fn action(kind: ActionKind, path: &str) -> Action {
        Action::new(
            kind,
            RelativePath::new(path).unwrap(),
            Arc::new(RootPair::new("/l", "/r")),
        )
    }

    #[test]
    fn test_copy_creates_parents() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/l/snippets/rust.json", "{}").add_dir("/r");

        let bytes = execute(&fs, &action(ActionKind::CopyToRight, "snippets/rust.json")).unwrap();
        assert_eq!(bytes, 2);
        assert_eq!(fs.read("/r/snippets/rust.json").unwrap(), b"{}");
    }

    #[test]
    fn test_copy_to_left_overwrites() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/l/settings.json", "old").add_file("/r/settings.json", "new!");

        execute(&fs, &action(ActionKind::CopyToLeft, "settings.json")).unwrap();
        assert_eq!(fs.read("/l/settings.json").unwrap(), b"new!");
    }

    #[test]
    fn test_delete_leaves_empty_parent() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/r/snippets/go.json", "{}");

        execute(&fs, &action(ActionKind::DeleteRight, "snippets/go.json")).unwrap();
        assert!(!fs.is_file("/r/snippets/go.json"));
        assert!(fs.is_dir("/r/snippets"));
    }

    #[test]
    fn test_delete_both_partial_failure_not_rolled_back() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/l/a", "a").add_file("/r/a", "a").set_read_only("/r/a");

        let err = execute(&fs, &action(ActionKind::DeleteBoth, "a")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
        assert_eq!(err.path, Path::new("/r/a"));
        assert!(!fs.is_file("/l/a"));
        assert!(fs.is_file("/r/a"));
    }

    #[test]
    fn test_skip_is_noop() {
        let fs = MemoryFileSystem::new();
        assert_eq!(execute(&fs, &action(ActionKind::Skip, "missing")).unwrap(), 0);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = execute(&fs, &action(ActionKind::DeleteLeft, "gone")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_copy_vanished_source_creates_nothing() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/l").add_dir("/r");

        let err = execute(&fs, &action(ActionKind::CopyToRight, "snippets/gone.json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.path, Path::new("/l/snippets/gone.json"));
        assert!(!fs.is_dir("/r/snippets"));
    }
}
