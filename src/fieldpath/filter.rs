//! Exclusion filters consulted by the diff engine.

use super::path::{Path, PathParseError};
use super::set::Set;

/// Filter decides which document locations are never compared.
///
/// An excluded path contributes nothing to a patch, and neither does anything
/// beneath it.
pub trait Filter {
    /// Returns true if `path` must be skipped.
    fn is_excluded(&self, path: &Path) -> bool;
}

/// ExcludeFilter excludes a set of paths and their subtrees.
///
/// Matching is exact per segment; there are no wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeFilter {
    excluded: Set,
}

impl ExcludeFilter {
    /// Creates a new ExcludeFilter.
    pub fn new(excluded: Set) -> Self {
        ExcludeFilter { excluded }
    }

    /// Creates a filter from already parsed paths.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        ExcludeFilter::new(Set::from_paths(paths))
    }

    /// Creates a filter by parsing path expressions.
    pub fn parse<I, S>(expressions: I) -> Result<Self, PathParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut excluded = Set::new();
        for expr in expressions {
            excluded.insert(&Path::parse(expr.as_ref())?);
        }
        Ok(ExcludeFilter { excluded })
    }

    /// Adds a path to the filter.
    pub fn exclude(&mut self, path: &Path) {
        self.excluded.insert(path);
    }

    /// Returns true if nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

impl Filter for ExcludeFilter {
    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.has_prefix_of(path)
    }
}

impl<F: Fn(&Path) -> bool> Filter for F {
    fn is_excluded(&self, path: &Path) -> bool {
        self(path)
    }
}
