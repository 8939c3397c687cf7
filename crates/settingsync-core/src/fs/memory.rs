//! In-memory filesystem for tests, with failure injection.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use super::{ContentHash, DirEntry, EntryKind, FileMeta, FileSystem};

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File { contents: Vec<u8>, modified: SystemTime },
    Symlink,
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    /// Paths that cannot be written, replaced or removed. For a directory,
    /// no children can be created or removed inside it.
    read_only: BTreeSet<PathBuf>,
    /// Directories that cannot be listed and files that cannot be read.
    unreadable: BTreeSet<PathBuf>,
    /// Logical clock so every file added by a setup helper gets a distinct
    /// modification time.
    clock: u64,
}

impl State {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + self.clock)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.parent().is_none() || matches!(self.nodes.get(path), Some(Node::Directory))
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        let parent_locked = path.parent().is_some_and(|p| self.read_only.contains(p));
        if self.read_only.contains(path) || parent_locked {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("read-only: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn insert_dirs(&mut self, path: &Path) -> io::Result<()> {
        let mut missing = Vec::new();
        let mut current = Some(path);
        while let Some(dir) = current {
            if dir.parent().is_none() {
                break;
            }
            match self.nodes.get(dir) {
                Some(Node::Directory) => break,
                Some(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("not a directory: {}", dir.display()),
                    ));
                }
                None => missing.push(dir.to_path_buf()),
            }
            current = dir.parent();
        }

        for dir in missing.into_iter().rev() {
            self.check_writable(&dir)?;
            self.nodes.insert(dir, Node::Directory);
        }
        Ok(())
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

/// A thread-safe in-memory filesystem.
///
/// Paths are absolute; the root (`/`) always exists. Setup helpers create
/// missing parent directories implicitly and bypass the read-only checks.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<State>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves the maps consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a directory and its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) -> &Self {
        let mut state = self.lock();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.parent().is_some() {
                state
                    .nodes
                    .entry(ancestor.to_path_buf())
                    .or_insert(Node::Directory);
            }
        }
        drop(state);
        self
    }

    /// Create or replace a file, creating parents as needed.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> &Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        let mut state = self.lock();
        let modified = state.tick();
        state.nodes.insert(
            path.to_path_buf(),
            Node::File {
                contents: contents.into(),
                modified,
            },
        );
        drop(state);
        self
    }

    /// Create a symbolic link entry.
    pub fn add_symlink(&self, path: impl AsRef<Path>) -> &Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.lock().nodes.insert(path.to_path_buf(), Node::Symlink);
        self
    }

    /// Override a file's modification time.
    pub fn set_modified(&self, path: impl AsRef<Path>, time: SystemTime) -> &Self {
        if let Some(Node::File { modified, .. }) = self.lock().nodes.get_mut(path.as_ref()) {
            *modified = time;
        }
        self
    }

    /// Make a file or directory read-only.
    pub fn set_read_only(&self, path: impl AsRef<Path>) -> &Self {
        self.lock().read_only.insert(path.as_ref().to_path_buf());
        self
    }

    /// Make a directory unlistable or a file unreadable.
    pub fn set_unreadable(&self, path: impl AsRef<Path>) -> &Self {
        self.lock().unreadable.insert(path.as_ref().to_path_buf());
        self
    }

    /// Read a file's content, or `None` if it is not a file.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().nodes.get(path.as_ref()) {
            Some(Node::File { contents, .. }) => Some(contents.clone()),
            _ => None,
        }
    }

    /// Check whether a file exists at a path.
    pub fn is_file(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.lock().nodes.get(path.as_ref()), Some(Node::File { .. }))
    }

    /// Check whether a directory exists at a path.
    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.lock().is_dir(path.as_ref())
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let state = self.lock();
        if !state.is_dir(path) {
            return Err(match state.nodes.get(path) {
                Some(_) => io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {}", path.display()),
                ),
                None => not_found(path),
            });
        }
        if state.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot list {}", path.display()),
            ));
        }

        let entries = state
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .filter_map(|(child, node)| {
                let kind = match node {
                    Node::Directory => EntryKind::Directory,
                    Node::File { .. } => EntryKind::File,
                    Node::Symlink => EntryKind::Symlink,
                };
                child.file_name().map(|name| DirEntry::new(name, kind))
            })
            .collect();
        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMeta> {
        let state = self.lock();
        if path.parent().is_none() {
            return Ok(FileMeta {
                kind: EntryKind::Directory,
                size: 0,
                modified: SystemTime::UNIX_EPOCH,
            });
        }
        match state.nodes.get(path) {
            Some(Node::Directory) => Ok(FileMeta {
                kind: EntryKind::Directory,
                size: 0,
                modified: SystemTime::UNIX_EPOCH,
            }),
            Some(Node::File { contents, modified }) => Ok(FileMeta {
                kind: EntryKind::File,
                size: contents.len() as u64,
                modified: *modified,
            }),
            Some(Node::Symlink) => Ok(FileMeta {
                kind: EntryKind::Symlink,
                size: 0,
                modified: SystemTime::UNIX_EPOCH,
            }),
            None => Err(not_found(path)),
        }
    }

    fn hash_file(&self, path: &Path) -> io::Result<ContentHash> {
        let state = self.lock();
        if state.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot read {}", path.display()),
            ));
        }
        match state.nodes.get(path) {
            Some(Node::File { contents, .. }) => Ok(ContentHash::of(contents)),
            _ => Err(not_found(path)),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let mut state = self.lock();
        if state.unreadable.contains(from) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot read {}", from.display()),
            ));
        }
        let (contents, modified) = match state.nodes.get(from) {
            Some(Node::File { contents, modified }) => (contents.clone(), *modified),
            _ => return Err(not_found(from)),
        };
        match to.parent() {
            Some(parent) if state.is_dir(parent) => {}
            _ => return Err(not_found(to)),
        }
        if matches!(state.nodes.get(to), Some(Node::Directory)) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", to.display()),
            ));
        }
        state.check_writable(to)?;

        let size = contents.len() as u64;
        state
            .nodes
            .insert(to.to_path_buf(), Node::File { contents, modified });
        Ok(size)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.lock().insert_dirs(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        match state.nodes.get(path) {
            Some(Node::File { .. }) | Some(Node::Symlink) => {}
            Some(Node::Directory) => {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("is a directory: {}", path.display()),
                ));
            }
            None => return Err(not_found(path)),
        }
        state.check_writable(path)?;
        state.nodes.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/home/user/settings.json", "{}");

        assert!(fs.is_dir("/home/user"));
        assert!(fs.is_file("/home/user/settings.json"));
        let entries = fs.read_dir(Path::new("/home")).unwrap();
        assert_eq!(entries, vec![DirEntry::new("user", EntryKind::Directory)]);
    }

    #[test]
    fn test_read_only_blocks_writes() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/src/a", "a").add_file("/dst/a", "old");
        fs.set_read_only("/dst/a");

        let err = fs
            .copy_file(Path::new("/src/a"), Path::new("/dst/a"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(fs.read("/dst/a").unwrap(), b"old");

        let err = fs.remove_file(Path::new("/dst/a")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_read_only_dir_blocks_children() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/locked").set_read_only("/locked");

        let err = fs.create_dir_all(Path::new("/locked/sub")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_unreadable_dir() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/secret/key", "k").set_unreadable("/secret");

        let err = fs.read_dir(Path::new("/secret")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_copy_keeps_modification_time() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/l/a", "a").add_file("/r/a", "old");

        fs.copy_file(Path::new("/l/a"), Path::new("/r/a")).unwrap();
        let source = fs.metadata(Path::new("/l/a")).unwrap().modified;
        assert_eq!(fs.metadata(Path::new("/r/a")).unwrap().modified, source);
    }

    #[test]
    fn test_copy_requires_parent() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/a", "a");

        let err = fs
            .copy_file(Path::new("/a"), Path::new("/missing/a"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
