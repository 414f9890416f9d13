//! Exclusion predicate over original file names
//!
//! Files named here must never be instrumented. Patterns are exact coverage
//! keys or globs (`vendor/**`), compiled once per run.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled set of excluded file patterns.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    set: GlobSet,
}

impl ExcludeSet {
    /// Compiles the given patterns. Invalid patterns fail construction.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob =
                Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .context("failed to compile exclude patterns")?;
        Ok(ExcludeSet { set })
    }

    /// A set that excludes nothing.
    pub fn empty() -> Self {
        ExcludeSet {
            set: GlobSet::empty(),
        }
    }

    /// Whether instrumentation must skip the given coverage key.
    pub fn is_excluded(&self, file: &str) -> bool {
        self.set.is_match(file)
    }
}
