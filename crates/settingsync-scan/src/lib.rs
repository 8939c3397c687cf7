//! Tree walking and diff classification for settingsync.
//!
//! # Overview
//!
//! `settingsync-scan` turns two directory trees into an ordered list of
//! [`DiffRecord`]s:
//!
//! - **Walking** lists every regular file under each root as a sorted
//!   [`RelativePath`], skipping symlinks and degrading unreadable
//!   sub-directories to warnings
//! - **Comparing** decides whether two files at the same relative path are
//!   identical (size, then BLAKE3 content hash by default)
//! - **Classifying** merges both listings into left-only, right-only and
//!   modified records, each with its candidate actions resolved
//!
//! Nothing here writes to disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use settingsync_scan::{diff, DiffConfig, OsFileSystem, Priority};
//!
//! let config = DiffConfig::builder()
//!     .left("/home/user/.config/Code/User")
//!     .right("/backup/linux/User")
//!     .priority(Priority::LeftWins)
//!     .build()
//!     .unwrap();
//!
//! let report = diff(&OsFileSystem::new(), &config).unwrap();
//! for record in &report.records {
//!     println!("{}", record.relative_path());
//! }
//! ```

mod classifier;
mod comparator;
mod walker;

pub use classifier::{diff, DiffClassifier, DiffReport, DiffStats};
pub use comparator::{Comparator, Comparison};
pub use walker::{TreeWalker, WalkOutput};

// Re-export core types for convenience
pub use settingsync_core::{
    Action, ActionKind, CompareMethod, DiffConfig, DiffRecord, FileSystem, MemoryFileSystem,
    OsFileSystem, Presence, Priority, RelativePath, RootPair, SyncError, SyncWarning, WarningKind,
};
