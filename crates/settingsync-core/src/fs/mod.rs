//! Filesystem collaborator used by the walker, comparator and executor.
//!
//! Everything that touches disk goes through [`FileSystem`], so the engine can
//! run against [`OsFileSystem`] in production and [`MemoryFileSystem`] in tests.

mod memory;
mod os;

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub use memory::MemoryFileSystem;
pub use os::OsFileSystem;

/// BLAKE3 content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash an in-memory buffer.
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Type of a directory entry, determined without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// Sockets, devices, etc.
    Other,
}

/// A single entry returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: OsString,
    /// Entry type.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Metadata for a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Entry type.
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Operations the reconciliation engine needs from a filesystem.
pub trait FileSystem: Send + Sync {
    /// List the entries of a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Read metadata for a path without following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<FileMeta>;

    /// Compute the BLAKE3 hash of a file's full content.
    fn hash_file(&self, path: &Path) -> io::Result<ContentHash>;

    /// Copy a file, overwriting the destination. Returns the bytes copied.
    ///
    /// The destination gets the source's modification time. Its parent
    /// directory must already exist.
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Create a directory and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Check whether a path exists.
    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        (**self).read_dir(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMeta> {
        (**self).metadata(path)
    }

    fn hash_file(&self, path: &Path) -> io::Result<ContentHash> {
        (**self).hash_file(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        (**self).copy_file(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        (**self).remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_hex() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_hex().starts_with("abab"));
    }

    #[test]
    fn test_content_hash_of() {
        assert_eq!(ContentHash::of(b"hello"), ContentHash::of(b"hello"));
        assert_ne!(ContentHash::of(b"hello"), ContentHash::of(b"world"));
    }
}
