//! Root-independent relative paths.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

#[cfg(windows)]
const SEGMENT_SEPARATORS: &[char] = &['/', '\\'];
#[cfg(not(windows))]
const SEGMENT_SEPARATORS: &[char] = &['/'];

/// A slash-separated path relative to a tree root.
///
/// Ordering compares path segments rather than raw strings, so `a/b` sorts
/// before `a.txt` (segment `a` < `a.txt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(CompactString);

impl RelativePath {
    /// Parse a relative path from external input, normalising `\` separators
    /// to `/`.
    pub fn new(path: impl AsRef<str>) -> Result<Self, SyncError> {
        let normalized = path.as_ref().replace('\\', "/");
        if normalized.is_empty() {
            return Err(SyncError::invalid_state("relative path cannot be empty"));
        }
        if normalized.starts_with('/') {
            return Err(SyncError::invalid_state(format!(
                "relative path cannot be absolute: {normalized}"
            )));
        }
        for segment in normalized.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(SyncError::invalid_state(format!(
                    "invalid segment in relative path: {normalized}"
                )));
            }
        }
        Ok(Self(normalized.into()))
    }

    /// Append a single segment.
    ///
    /// The segment must not contain a native separator.
    pub fn join(&self, segment: &str) -> Result<Self, SyncError> {
        let child = Self::from_segment(segment)?;
        Ok(Self(format!("{}/{}", self.0, child.0).into()))
    }

    /// Create a path consisting of a single segment, such as a directory
    /// entry name.
    ///
    /// Unlike [`new`](Self::new), `\` is kept literally on platforms where it
    /// is not a separator, so `odd\name.json` stays one file name on Unix.
    pub fn from_segment(segment: &str) -> Result<Self, SyncError> {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(SyncError::invalid_state(format!(
                "invalid path segment: {segment:?}"
            )));
        }
        if segment.contains(SEGMENT_SEPARATORS) {
            return Err(SyncError::invalid_state(format!(
                "segment contains a separator: {segment}"
            )));
        }
        Ok(Self(segment.into()))
    }

    /// The slash-separated string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The final segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Resolve this path under a root directory using native separators.
    pub fn under(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }
}

impl Ord for RelativePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments().cmp(other.segments())
    }
}

impl PartialOrd for RelativePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RelativePath> for String {
    fn from(value: RelativePath) -> Self {
        value.0.into()
    }
}
