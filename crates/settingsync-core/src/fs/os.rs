//! `std::fs` backed implementation.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::{ContentHash, DirEntry, EntryKind, FileMeta, FileSystem};

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    /// Create a new handle to the real filesystem.
    pub fn new() -> Self {
        Self
    }
}

fn entry_kind(file_type: fs::FileType) -> EntryKind {
    if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

/// Give `to` the modification time of `from`.
fn preserve_modified(from: &Path, to: &Path) -> io::Result<()> {
    let modified = fs::metadata(from)?.modified()?;
    // A copy of a read-only file is read-only too; the owner can still set times.
    let dest = File::options()
        .write(true)
        .open(to)
        .or_else(|_| File::open(to))?;
    dest.set_modified(modified)
}

impl FileSystem for OsFileSystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let kind = entry_kind(entry.file_type()?);
            entries.push(DirEntry::new(entry.file_name(), kind));
        }
        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMeta> {
        let metadata = fs::symlink_metadata(path)?;
        let kind = entry_kind(metadata.file_type());
        Ok(FileMeta {
            kind,
            size: if kind == EntryKind::Directory { 0 } else { metadata.len() },
            modified: metadata.modified().unwrap_or(std::time::UNIX_EPOCH),
        })
    }

    fn hash_file(&self, path: &Path) -> io::Result<ContentHash> {
        let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, File::open(path)?);
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(ContentHash::new(*hasher.finalize().as_bytes()))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let copied = fs::copy(from, to)?;
        preserve_modified(from, to)?;
        Ok(copied)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
