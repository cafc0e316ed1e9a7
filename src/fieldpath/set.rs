//! Set of paths stored as a prefix tree.

use super::path::{Path, PathElement};
use std::collections::{BTreeMap, BTreeSet};

/// SetNodeMap maps PathElements to child Sets.
pub type SetNodeMap = BTreeMap<PathElement, Set>;

/// Set is a tree of paths, shared prefixes stored once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Set {
    /// Paths that end at this level.
    members: BTreeSet<PathElement>,
    /// Nested children for deeper paths.
    children: SetNodeMap,
    /// True if the empty path (root itself) is in this set.
    root_in_set: bool,
}

impl Set {
    /// Creates a new empty set.
    pub fn new() -> Self {
        Set::default()
    }

    /// Creates a set from the given paths.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut set = Set::new();
        for path in paths {
            set.insert(path);
        }
        set
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        !self.root_in_set && self.members.is_empty() && self.children.is_empty()
    }

    /// Inserts a path into the set.
    pub fn insert(&mut self, path: &Path) {
        let elements = path.as_slice();
        let Some((last, parents)) = elements.split_last() else {
            self.root_in_set = true;
            return;
        };

        let mut node = self;
        for element in parents {
            node = node.children.entry(element.clone()).or_default();
        }
        node.members.insert(last.clone());
    }

    /// Returns true if some path in the set is a prefix of (or equal to) `path`.
    pub fn has_prefix_of(&self, path: &Path) -> bool {
        if self.root_in_set {
            return true;
        }

        let mut node = self;
        for element in path {
            if node.members.contains(element) {
                return true;
            }
            match node.children.get(element) {
                Some(child) => node = child,
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(expr: &str) -> Path {
        Path::parse(expr).unwrap()
    }

    #[test]
    fn test_insert() {
        let mut set = Set::new();
        assert!(set.is_empty());

        set.insert(&p("metadata.resourceVersion"));
        set.insert(&p("status"));

        assert!(!set.is_empty());
        assert!(set.has_prefix_of(&p("status")));
        assert!(set.has_prefix_of(&p("metadata.resourceVersion")));
        assert!(set.has_prefix_of(&p("metadata.resourceVersion.x")));
        assert!(!set.has_prefix_of(&p("metadata")));
        assert!(!set.has_prefix_of(&p("metadata.name")));
    }

    #[test]
    fn test_has_prefix_of() {
        let set = Set::from_paths(&[p("status"), p("metadata.annotations")]);

        assert!(set.has_prefix_of(&p("status")));
        assert!(set.has_prefix_of(&p("status.conditions")));
        assert!(set.has_prefix_of(&p(r#"metadata.annotations["example.com/x"]"#)));
        assert!(!set.has_prefix_of(&p("metadata")));
        assert!(!set.has_prefix_of(&p("metadata.labels")));
        assert!(!set.has_prefix_of(&p("spec")));
        assert!(!set.has_prefix_of(&Path::new()));
    }

    #[test]
    fn test_root_excludes_everything() {
        let mut set = Set::new();
        set.insert(&Path::new());
        assert!(set.has_prefix_of(&p("anything.at.all")));
        assert!(set.has_prefix_of(&Path::new()));
    }
}
