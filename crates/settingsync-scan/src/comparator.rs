//! File equality checks for paths present in both trees.

use std::path::Path;

use settingsync_core::{CompareMethod, FileSystem, SyncWarning};

/// Outcome of comparing two files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Same content.
    Equal,
    /// Content differs.
    Different,
    /// The files could not be compared. Treated as different by the classifier.
    Unknown(SyncWarning),
}

impl Comparison {
    /// Whether the files are known to be identical.
    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }
}

/// Compares two files according to a [`CompareMethod`].
///
/// Ownership and permission bits never take part in the comparison.
pub struct Comparator<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    method: CompareMethod,
}

impl<'a, F: FileSystem + ?Sized> Comparator<'a, F> {
    /// Create a comparator.
    pub fn new(fs: &'a F, method: CompareMethod) -> Self {
        Self { fs, method }
    }

    /// Compare two existing files.
    pub fn compare(&self, left: &Path, right: &Path) -> Comparison {
        let left_meta = match self.fs.metadata(left) {
            Ok(meta) => meta,
            Err(err) => return Comparison::Unknown(SyncWarning::compare_failed(left, &err)),
        };
        let right_meta = match self.fs.metadata(right) {
            Ok(meta) => meta,
            Err(err) => return Comparison::Unknown(SyncWarning::compare_failed(right, &err)),
        };

        // Unequal sizes can never be equal content
        if left_meta.size != right_meta.size {
            return Comparison::Different;
        }

        match self.method {
            CompareMethod::SizeAndModified => {
                if left_meta.modified == right_meta.modified {
                    Comparison::Equal
                } else {
                    Comparison::Different
                }
            }
            CompareMethod::Content => {
                let left_hash = match self.fs.hash_file(left) {
                    Ok(hash) => hash,
                    Err(err) => return Comparison::Unknown(SyncWarning::compare_failed(left, &err)),
                };
                let right_hash = match self.fs.hash_file(right) {
                    Ok(hash) => hash,
                    Err(err) => {
                        return Comparison::Unknown(SyncWarning::compare_failed(right, &err));
                    }
                };
                if left_hash == right_hash {
                    Comparison::Equal
                } else {
                    Comparison::Different
                }
            }
        }
    }
}
