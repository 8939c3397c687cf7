//! Recursive tree walker producing sorted relative file paths.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use tracing::{debug, warn};

use settingsync_core::{DirEntry, EntryKind, FileSystem, RelativePath, SyncError, SyncWarning};

/// Result of walking one tree.
#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    /// Every regular file under the root, sorted by path segments.
    pub files: Vec<RelativePath>,
    /// Sub-trees that could not be enumerated and entries that were skipped.
    pub warnings: Vec<SyncWarning>,
}

/// Lists every regular file below a root.
///
/// Symbolic links are never followed: they are skipped and reported as a
/// warning, so link cycles cannot occur. A sub-directory that cannot be read
/// is dropped with a warning; only failure on the root itself is an error.
pub struct TreeWalker<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    ignore: Option<&'a GlobSet>,
}

impl<'a, F: FileSystem + ?Sized> TreeWalker<'a, F> {
    /// Create a walker over a filesystem.
    pub fn new(fs: &'a F) -> Self {
        Self { fs, ignore: None }
    }

    /// Skip entries whose relative path matches `ignore`.
    pub fn with_ignore(mut self, ignore: &'a GlobSet) -> Self {
        self.ignore = Some(ignore);
        self
    }

    /// Walk the tree rooted at `root`.
    pub fn walk(&self, root: &Path) -> Result<WalkOutput, SyncError> {
        let meta = self.fs.metadata(root).map_err(|e| SyncError::io(root, e))?;
        if !matches!(meta.kind, EntryKind::Directory | EntryKind::Symlink) {
            return Err(SyncError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut output = WalkOutput::default();
        let root_entries = self.fs.read_dir(root).map_err(|e| SyncError::io(root, e))?;

        let mut pending: Vec<(PathBuf, Option<RelativePath>)> = Vec::new();
        self.visit(root, None, root_entries, &mut pending, &mut output);

        while let Some((dir, relative)) = pending.pop() {
            match self.fs.read_dir(&dir) {
                Ok(entries) => self.visit(&dir, relative.as_ref(), entries, &mut pending, &mut output),
                Err(err) => {
                    let warning = SyncWarning::read_error(&dir, &err);
                    warn!(path = %dir.display(), "{warning}");
                    output.warnings.push(warning);
                }
            }
        }

        output.files.sort();
        output.files.dedup();
        Ok(output)
    }

    fn visit(
        &self,
        dir: &Path,
        relative: Option<&RelativePath>,
        entries: Vec<DirEntry>,
        pending: &mut Vec<(PathBuf, Option<RelativePath>)>,
        output: &mut WalkOutput,
    ) {
        for entry in entries {
            let path = dir.join(&entry.name);
            let child = entry.name.to_str().and_then(|name| match relative {
                Some(parent) => parent.join(name).ok(),
                None => RelativePath::from_segment(name).ok(),
            });
            let Some(child) = child else {
                let warning = SyncWarning::invalid_name(&path);
                warn!(path = %path.display(), "{warning}");
                output.warnings.push(warning);
                continue;
            };

            if self.ignore.is_some_and(|set| set.is_match(child.as_str())) {
                debug!(path = %child, "ignored");
                continue;
            }

            match entry.kind {
                EntryKind::File => output.files.push(child),
                EntryKind::Directory => pending.push((path, Some(child))),
                EntryKind::Symlink => {
                    let warning = SyncWarning::skipped_symlink(&path);
                    debug!(path = %path.display(), "skipping symlink");
                    output.warnings.push(warning);
                }
                EntryKind::Other => {
                    debug!(path = %path.display(), "skipping special file");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::{Glob, GlobSetBuilder};
    use settingsync_core::{MemoryFileSystem, WarningKind};

    fn names(output: &WalkOutput) -> Vec<&str> {
        output.files.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_walk_sorted_relative_paths() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/root/b.txt", "b")
            .add_file("/root/a/z.txt", "z")
            .add_file("/root/a.txt", "a")
            .add_dir("/root/empty");

        let output = TreeWalker::new(&fs).walk(Path::new("/root")).unwrap();
        assert_eq!(names(&output), vec!["a/z.txt", "a.txt", "b.txt"]);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let fs = MemoryFileSystem::new();
        let err = TreeWalker::new(&fs).walk(Path::new("/nope")).unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
    }

    #[test]
    fn test_file_root_is_not_a_directory() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/file", "x");
        let err = TreeWalker::new(&fs).walk(Path::new("/file")).unwrap_err();
        assert!(matches!(err, SyncError::NotADirectory { .. }));
    }

    #[test]
    fn test_unreadable_subdir_is_warning() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/root/ok.txt", "ok")
            .add_file("/root/locked/secret.txt", "s")
            .set_unreadable("/root/locked");

        let output = TreeWalker::new(&fs).walk(Path::new("/root")).unwrap();
        assert_eq!(names(&output), vec!["ok.txt"]);
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].kind, WarningKind::PermissionDenied);
    }

    #[test]
    fn test_symlinks_skipped() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/root/real.txt", "r").add_symlink("/root/loop");

        let output = TreeWalker::new(&fs).walk(Path::new("/root")).unwrap();
        assert_eq!(names(&output), vec!["real.txt"]);
        assert_eq!(output.warnings[0].kind, WarningKind::SkippedSymlink);
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_in_name_is_a_file() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/root/odd\\name.json", "{}")
            .add_file("/root/snippets/a\\b.json", "{}");

        let output = TreeWalker::new(&fs).walk(Path::new("/root")).unwrap();
        assert_eq!(names(&output), vec!["odd\\name.json", "snippets/a\\b.json"]);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_ignore_prunes_directories() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/root/settings.json", "{}")
            .add_file("/root/globalStorage/state.vscdb", "db")
            .add_file("/root/snippets/go.json", "{}");

        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new("globalStorage").unwrap());
        let ignore = builder.build().unwrap();

        let output = TreeWalker::new(&fs)
            .with_ignore(&ignore)
            .walk(Path::new("/root"))
            .unwrap();
        assert_eq!(names(&output), vec!["settings.json", "snippets/go.json"]);
    }
}
