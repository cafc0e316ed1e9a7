//! Options controlling patch computation.
//!
//! Options can be built in code or loaded from a YAML/JSON file:
//!
//! ```yaml
//! excludePaths:
//!   - metadata.annotations["example.com/last-applied"]
//! serverManaged: true
//! maxDepth: 64
//! ```

use crate::error::{PatchError, Result};
use crate::fieldpath::{ExcludeFilter, Path};
use crate::value::DEFAULT_MAX_DEPTH;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use tracing::debug;

/// Fields written by the API server rather than by reconcilers.
pub static SERVER_MANAGED_PATHS: Lazy<Vec<Path>> = Lazy::new(|| {
    vec![
        Path::from_fields(["status"]),
        Path::from_fields(["metadata", "resourceVersion"]),
        Path::from_fields(["metadata", "managedFields"]),
        Path::from_fields(["metadata", "uid"]),
        Path::from_fields(["metadata", "generation"]),
        Path::from_fields(["metadata", "creationTimestamp"]),
        Path::from_fields(["metadata", "selfLink"]),
    ]
});

/// Options for computing a merge patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Options {
    /// Path expressions never compared nor emitted.
    pub exclude_paths: Vec<String>,
    /// Also exclude [`SERVER_MANAGED_PATHS`].
    pub server_managed: bool,
    /// Maximum object nesting accepted.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            exclude_paths: Vec::new(),
            server_managed: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    /// Adds an exclusion path expression.
    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.exclude_paths.push(path.into());
        self
    }

    /// Adds several exclusion path expressions.
    pub fn exclude_all<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn server_managed(mut self, enabled: bool) -> Self {
        self.server_managed = enabled;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses options from YAML (JSON is accepted too).
    pub fn from_yaml_str(yaml: &str) -> Result<Options> {
        let options: Options =
            serde_yaml::from_str(yaml).map_err(|e| PatchError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a file.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Options> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading options");
        let content = std::fs::read_to_string(path)?;
        Options::from_yaml_str(&content)
    }

    /// Checks that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(PatchError::Config("maxDepth must be at least 1".to_string()));
        }
        for expr in &self.exclude_paths {
            Path::parse(expr)?;
        }
        Ok(())
    }

    /// Builds the exclusion filter described by these options.
    pub fn filter(&self) -> Result<ExcludeFilter> {
        let mut filter = ExcludeFilter::parse(&self.exclude_paths)?;
        if self.server_managed {
            for path in SERVER_MANAGED_PATHS.iter() {
                filter.exclude(path);
            }
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldpath::Filter;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.exclude_paths.is_empty());
        assert!(!options.server_managed);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.filter().unwrap().is_empty());
    }

    #[test]
    fn test_from_yaml() {
        let options = Options::from_yaml_str(
            r#"
excludePaths:
  - spec.paused
  - metadata.annotations["example.com/owner"]
serverManaged: true
"#,
        )
        .unwrap();
        assert_eq!(options.exclude_paths.len(), 2);
        assert!(options.server_managed);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);

        let filter = options.filter().unwrap();
        assert!(filter.is_excluded(&Path::from_fields(["spec", "paused"])));
        assert!(filter.is_excluded(&Path::from_fields(["status", "phase"])));
        assert!(filter.is_excluded(&Path::from_fields(["metadata", "resourceVersion"])));
        assert!(!filter.is_excluded(&Path::from_fields(["metadata", "labels"])));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(
            Options::from_yaml_str("ignorePaths: [a]"),
            Err(PatchError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Options::from_yaml_str("maxDepth: 0"),
            Err(PatchError::Config(_))
        ));
        assert!(matches!(
            Options::from_yaml_str("excludePaths: ['a..b']"),
            Err(PatchError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_builder() {
        let options = Options::new()
            .exclude("status")
            .exclude_all(["metadata.uid"])
            .max_depth(8);
        assert_eq!(options.exclude_paths, vec!["status", "metadata.uid"]);
        assert_eq!(options.max_depth, 8);
    }
}
