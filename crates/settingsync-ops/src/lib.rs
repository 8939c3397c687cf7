//! Action execution engine for settingsync.
//!
//! This crate is the only part of settingsync that writes to disk. It
//! executes resolved [`Action`](settingsync_core::Action)s one at a time
//! with [`execute`], or all at once with [`start_batch`], [`execute_batch`]
//! or [`execute_batch_with_progress`], reporting progress via channels and
//! collecting a per-action outcome instead of stopping at the first failure.

mod batch;
mod executor;
mod operation;
mod progress;
mod render;

pub use batch::{execute_batch, execute_batch_with_progress, start_batch, BatchEvent};
pub use executor::execute;
pub use operation::OperationError;
pub use progress::{ActionOutcome, BatchFailed, BatchProgress, BatchReport};
pub use render::render;

/// Default channel buffer size for batch progress updates.
pub const BATCH_CHANNEL_SIZE: usize = 100;
