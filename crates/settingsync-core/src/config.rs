//! Diff configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::action::Priority;
use crate::error::SyncError;

/// How two files present on both sides are judged identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompareMethod {
    /// Size first, then full BLAKE3 content hash.
    #[default]
    Content,
    /// Equal size and equal modification time. Cheaper, but files touched
    /// without a content change are reported as different.
    SizeAndModified,
}

/// Configuration for a single diff run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DiffConfig {
    /// Left root directory.
    pub left: PathBuf,

    /// Right root directory.
    pub right: PathBuf,

    /// Which side wins when the trees disagree.
    #[builder(default)]
    #[serde(default)]
    pub priority: Priority,

    /// Also report files that are identical on both sides.
    #[builder(default = "false")]
    #[serde(default)]
    pub include_identical: bool,

    /// Equality policy for files present on both sides.
    #[builder(default)]
    #[serde(default)]
    pub compare: CompareMethod,

    /// Glob patterns matched against slash-separated relative paths.
    /// Matching directories are not descended into.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

impl DiffConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        for (side, root) in [("Left", &self.left), ("Right", &self.right)] {
            match root {
                Some(root) if root.as_os_str().is_empty() => {
                    return Err(format!("{side} root path cannot be empty"));
                }
                Some(_) => {}
                None => return Err(format!("{side} root path is required")),
            }
        }
        if let Some(patterns) = &self.ignore_patterns {
            compile_patterns(patterns).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl DiffConfig {
    /// Create a new diff config builder.
    pub fn builder() -> DiffConfigBuilder {
        DiffConfigBuilder::default()
    }

    /// Create a simple config comparing two roots with default settings.
    pub fn new(left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            priority: Priority::default(),
            include_identical: false,
            compare: CompareMethod::default(),
            ignore_patterns: Vec::new(),
        }
    }

    /// Compile the ignore patterns.
    pub fn ignore_set(&self) -> Result<GlobSet, SyncError> {
        compile_patterns(&self.ignore_patterns)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<GlobSet, SyncError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| SyncError::InvalidConfig {
            message: format!("invalid ignore pattern {pattern:?}: {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| SyncError::InvalidConfig {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DiffConfig::builder()
            .left("/home/user/.config/Code/User")
            .right("/backup/linux/User")
            .priority(Priority::RightWins)
            .include_identical(true)
            .build()
            .unwrap();

        assert_eq!(config.right, PathBuf::from("/backup/linux/User"));
        assert_eq!(config.priority, Priority::RightWins);
        assert!(config.include_identical);
        assert_eq!(config.compare, CompareMethod::Content);
    }

    #[test]
    fn test_config_requires_roots() {
        assert!(DiffConfig::builder().left("/a").build().is_err());
        assert!(DiffConfig::builder().left("").right("/b").build().is_err());
    }

    #[test]
    fn test_config_rejects_bad_pattern() {
        let result = DiffConfig::builder()
            .left("/a")
            .right("/b")
            .ignore_patterns(vec!["globalStorage/[".to_string()])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_ignore_set_matches() {
        let mut config = DiffConfig::new("/a", "/b");
        config.ignore_patterns = vec!["globalStorage".to_string(), "**/*.log".to_string()];
        let set = config.ignore_set().unwrap();

        assert!(set.is_match("globalStorage"));
        assert!(set.is_match("logs/main.log"));
        assert!(!set.is_match("settings.json"));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: DiffConfig =
            serde_json::from_str(r#"{"left": "/a", "right": "/b"}"#).unwrap();
        assert_eq!(config.priority, Priority::LeftWins);
        assert!(config.ignore_patterns.is_empty());
    }
}
