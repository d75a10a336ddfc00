#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `pdumpfs_filters` decides which source entries a snapshot run skips. A
//! run combines three independent rule families: regular expressions matched
//! against the full walked path, shell-style globs matched against the
//! basename of regular files, and an optional minimum-size threshold applied
//! to regular files. An entry is excluded when *any* rule matches; the
//! evaluation order is immaterial.
//!
//! # Design
//!
//! - [`Matcher`] is the seam the engine depends on. It receives the walked
//!   path together with the `lstat` metadata the walker already holds, so
//!   matching never follows symbolic links and never repeats a stat.
//! - [`MatchNothing`] is the trivial matcher used when no exclusion options
//!   were given.
//! - [`ExcludeSet`] owns the compiled rules. Patterns and globs are compiled
//!   when they are added, so an invalid expression surfaces before the walk
//!   starts rather than halfway through it.
//!
//! # Invariants
//!
//! - Globs and the size threshold apply to regular files only; directories
//!   and symlinks are never excluded by them.
//! - Adding a rule can only shrink the set of materialized entries.
//!
//! # Errors
//!
//! [`ExcludeSet::add_pattern`] and [`ExcludeSet::add_glob`] report
//! [`FilterError`] carrying the offending expression when compilation fails.
//!
//! # Examples
//!
//! ```
//! use pdumpfs_filters::{ExcludeSet, Matcher};
//! use std::fs;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let keep = temp.path().join("notes.txt");
//! let skip = temp.path().join("core.swp");
//! fs::write(&keep, b"keep")?;
//! fs::write(&skip, b"skip")?;
//!
//! let mut rules = ExcludeSet::new();
//! rules.add_glob("*.swp")?;
//!
//! assert!(!rules.excludes(&keep, &fs::symlink_metadata(&keep)?));
//! assert!(rules.excludes(&skip, &fs::symlink_metadata(&skip)?));
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;

mod size;

pub use size::{parse_size_limit, SizeLimitError};

/// Decides whether a walked entry should be skipped.
///
/// `metadata` must come from `lstat` (`fs::symlink_metadata`) so symbolic
/// links are judged by their own attributes, never their target's.
pub trait Matcher {
    /// Returns `true` when `path` must not be materialized.
    fn excludes(&self, path: &Path, metadata: &fs::Metadata) -> bool;
}

/// Matcher that never excludes anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchNothing;

impl Matcher for MatchNothing {
    fn excludes(&self, _path: &Path, _metadata: &fs::Metadata) -> bool {
        false
    }
}

/// Error produced when an exclusion rule cannot be compiled.
#[derive(Debug)]
pub struct FilterError {
    expression: String,
    kind: FilterErrorKind,
}

#[derive(Debug)]
enum FilterErrorKind {
    Pattern(regex::Error),
    Glob(globset::Error),
}

impl FilterError {
    fn pattern(expression: &str, source: regex::Error) -> Self {
        Self {
            expression: expression.to_string(),
            kind: FilterErrorKind::Pattern(source),
        }
    }

    fn glob(expression: &str, source: globset::Error) -> Self {
        Self {
            expression: expression.to_string(),
            kind: FilterErrorKind::Glob(source),
        }
    }

    /// Returns the expression that failed to compile.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FilterErrorKind::Pattern(source) => write!(
                f,
                "failed to compile exclude pattern '{}': {}",
                self.expression, source
            ),
            FilterErrorKind::Glob(source) => write!(
                f,
                "failed to compile exclude glob '{}': {}",
                self.expression, source
            ),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FilterErrorKind::Pattern(source) => Some(source),
            FilterErrorKind::Glob(source) => Some(source),
        }
    }
}

/// Compiled exclusion rules for one snapshot run.
#[derive(Debug, Default)]
pub struct ExcludeSet {
    patterns: Vec<Regex>,
    globs: Vec<GlobMatcher>,
    size_limit: Option<u64>,
}

impl ExcludeSet {
    /// Creates an empty set that excludes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `pattern` as a regular expression matched against the full
    /// walked path.
    pub fn add_pattern(&mut self, pattern: &str) -> Result<(), FilterError> {
        let compiled = Regex::new(pattern).map_err(|error| FilterError::pattern(pattern, error))?;
        self.patterns.push(compiled);
        Ok(())
    }

    /// Compiles `glob` as a shell-style glob matched against the basename of
    /// regular files.
    pub fn add_glob(&mut self, glob: &str) -> Result<(), FilterError> {
        let compiled = GlobBuilder::new(glob)
            .backslash_escape(true)
            .build()
            .map_err(|error| FilterError::glob(glob, error))?;
        self.globs.push(compiled.compile_matcher());
        Ok(())
    }

    /// Excludes regular files whose size is at least `limit` bytes.
    pub fn set_size_limit(&mut self, limit: u64) {
        self.size_limit = Some(limit);
    }

    /// Reports whether the set carries no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.globs.is_empty() && self.size_limit.is_none()
    }

    fn matches_size(&self, metadata: &fs::Metadata) -> bool {
        match self.size_limit {
            Some(limit) => metadata.is_file() && metadata.len() >= limit,
            None => false,
        }
    }

    fn matches_pattern(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.patterns.iter().any(|pattern| pattern.is_match(&text))
    }

    fn matches_glob(&self, path: &Path, metadata: &fs::Metadata) -> bool {
        if !metadata.is_file() {
            return false;
        }
        let Some(name) = path.file_name() else {
            return false;
        };
        self.globs.iter().any(|glob| glob.is_match(Path::new(name)))
    }
}

impl Matcher for ExcludeSet {
    fn excludes(&self, path: &Path, metadata: &fs::Metadata) -> bool {
        self.matches_size(metadata) || self.matches_pattern(path) || self.matches_glob(path, metadata)
    }
}
