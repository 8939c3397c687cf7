//! Core types and traits for settingsync.
//!
//! This crate provides the data model shared by the reconciliation engine:
//! relative paths, diff records, actions and priorities, the configuration
//! for a diff run, and the [`FileSystem`] collaborator every I/O step uses.
//! The action resolver lives here too, since it is a pure function of a
//! record and a priority.

mod action;
mod config;
mod error;
pub mod fs;
mod path;
mod record;
mod resolve;

pub use action::{Action, ActionKind, Priority, RootPair};
pub use config::{CompareMethod, DiffConfig, DiffConfigBuilder};
pub use error::{ErrorKind, SyncError, SyncWarning, WarningKind};
pub use fs::{ContentHash, DirEntry, EntryKind, FileMeta, FileSystem, MemoryFileSystem, OsFileSystem};
pub use path::RelativePath;
pub use record::{DiffRecord, Presence};
pub use resolve::{candidate_kinds, resolve};
