use crate::error::{Result, ScanError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

/// Directory names never descended into unless configured otherwise
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".terraform",
    ".idea",
    ".vscode",
    ".external_modules",
    ".git",
];

/// Options of a [`crate::Scanner`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
    /// Glob patterns matched against directory names; matching directories are skipped
    #[serde(rename = "exclude")]
    pub excluded_dirs: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl ScanOptions {
    /// Default exclusions plus `extra`
    pub fn with_exclusions<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in extra {
            let pattern = pattern.into();
            if !self.excluded_dirs.contains(&pattern) {
                self.excluded_dirs.push(pattern);
            }
        }
        self
    }

    pub(crate) fn exclusion_matcher(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_dirs {
            let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidExclusion {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ScanError::InvalidExclusion {
            pattern: self.excluded_dirs.join(", "),
            source,
        })
    }
}
