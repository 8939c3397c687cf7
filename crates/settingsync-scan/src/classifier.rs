//! Diff classification: merge two walked trees into sorted diff records.

use std::sync::Arc;
use std::time::{Duration, Instant};

use itertools::{EitherOrBoth, Itertools};
use serde::Serialize;
use tracing::{debug, warn};

use settingsync_core::{
    Action, DiffConfig, DiffRecord, FileSystem, Presence, Priority, RootPair, SyncError,
    SyncWarning,
};

use crate::comparator::{Comparator, Comparison};
use crate::walker::TreeWalker;

/// Summary counts for a diff run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    /// Files only under the left root.
    pub left_only: usize,
    /// Files only under the right root.
    pub right_only: usize,
    /// Files on both sides with different content.
    pub modified: usize,
    /// Files on both sides with identical content (counted even when not reported).
    pub identical: usize,
}

/// Complete result of diffing two trees.
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    /// The roots that were compared.
    pub roots: Arc<RootPair>,
    /// Priority the candidate actions were resolved with.
    pub priority: Priority,
    /// One record per differing path, sorted by relative path.
    pub records: Vec<DiffRecord>,
    /// Warnings from walking both trees and from failed comparisons.
    pub warnings: Vec<SyncWarning>,
    /// Summary counts.
    pub stats: DiffStats,
    /// Duration of the diff. Not serialized, so JSON output of unchanged
    /// trees stays byte-identical across runs.
    #[serde(skip)]
    pub duration: Duration,
}

impl DiffReport {
    /// Whether the trees agree (ignoring identical records).
    pub fn is_in_sync(&self) -> bool {
        self.records.iter().all(|r| r.content_equal())
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The recommended action of every record that has one.
    pub fn default_actions(&self) -> Vec<Action> {
        self.records
            .iter()
            .filter_map(|r| r.default_action().cloned())
            .collect()
    }
}

/// Computes the differences between two directory trees.
pub struct DiffClassifier<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> DiffClassifier<'a, F> {
    /// Create a classifier over a filesystem.
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Diff the two roots named by `config`.
    ///
    /// Fails only when one of the roots cannot be walked.
    pub fn diff(&self, config: &DiffConfig) -> Result<DiffReport, SyncError> {
        let start = Instant::now();
        let ignore = config.ignore_set()?;
        let roots = Arc::new(RootPair::new(&config.left, &config.right));

        let walker = TreeWalker::new(self.fs).with_ignore(&ignore);
        let left = walker.walk(&roots.left)?;
        let right = walker.walk(&roots.right)?;

        let mut warnings = left.warnings;
        warnings.extend(right.warnings);

        let comparator = Comparator::new(self.fs, config.compare);
        let mut stats = DiffStats::default();
        let mut records = Vec::new();

        // Both lists are sorted by the same order, so a merge join yields
        // the left-only, right-only and shared paths in output order.
        for pair in left
            .files
            .into_iter()
            .merge_join_by(right.files, |l, r| l.cmp(r))
        {
            let (relative_path, presence) = match pair {
                EitherOrBoth::Left(path) => {
                    stats.left_only += 1;
                    (path, Presence::LeftOnly)
                }
                EitherOrBoth::Right(path) => {
                    stats.right_only += 1;
                    (path, Presence::RightOnly)
                }
                EitherOrBoth::Both(path, _) => {
                    let comparison =
                        comparator.compare(&path.under(&roots.left), &path.under(&roots.right));
                    let content_equal = match comparison {
                        Comparison::Equal => true,
                        Comparison::Different => false,
                        Comparison::Unknown(warning) => {
                            warn!(path = %path, "{warning}");
                            warnings.push(warning);
                            false
                        }
                    };
                    if content_equal {
                        stats.identical += 1;
                        if !config.include_identical {
                            continue;
                        }
                    } else {
                        stats.modified += 1;
                    }
                    (path, Presence::Both { content_equal })
                }
            };

            records.push(DiffRecord::new(
                relative_path,
                presence,
                Arc::clone(&roots),
                config.priority,
            ));
        }

        let duration = start.elapsed();
        debug!(
            records = records.len(),
            warnings = warnings.len(),
            elapsed_ms = duration.as_millis() as u64,
            "diff complete"
        );

        Ok(DiffReport {
            roots,
            priority: config.priority,
            records,
            warnings,
            stats,
            duration,
        })
    }
}

/// Diff the two roots named by `config`.
pub fn diff<F: FileSystem + ?Sized>(fs: &F, config: &DiffConfig) -> Result<DiffReport, SyncError> {
    DiffClassifier::new(fs).diff(config)
}
