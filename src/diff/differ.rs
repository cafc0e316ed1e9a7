//! Minimal overlay computation.

use crate::error::{PatchError, Result};
use crate::fieldpath::{ExcludeFilter, Filter, Path, PathElement};
use crate::value::{Map, Value, DEFAULT_MAX_DEPTH};
use tracing::trace;

/// Differ computes the overlay that aligns an observed document to a desired one.
///
/// The overlay holds only what has to change:
/// - keys of `desired` missing from `observed` are added with their full value,
/// - objects present on both sides are recursed into and pruned when equal,
/// - every other value (lists, typed maps, scalars) is replaced as a whole
///   when it differs,
/// - keys only in `observed` are left alone and never deleted,
/// - `null` in `desired` means "no opinion" and is never emitted,
/// - excluded paths and their subtrees are skipped entirely.
pub struct Differ<'a> {
    filter: &'a dyn Filter,
    max_depth: usize,
}

impl<'a> Differ<'a> {
    /// Creates a new Differ using the given exclusion filter.
    pub fn new(filter: &'a dyn Filter) -> Self {
        Differ {
            filter,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum object nesting the differ will descend into.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Computes the overlay. The result is empty when nothing has to change.
    pub fn diff(&self, observed: &Map, desired: &Map) -> Result<Map> {
        self.diff_map(observed, desired, &mut Path::new())
    }

    fn diff_map(&self, observed: &Map, desired: &Map, path: &mut Path) -> Result<Map> {
        self.check_depth(path)?;

        let mut overlay = Map::new();
        for (key, desired_value) in desired.iter() {
            path.push(PathElement::field_name(key.clone()));
            let changed = self.diff_field(observed.get(key), desired_value, path)?;
            path.pop();

            if let Some(value) = changed {
                overlay.fields.insert(key.clone(), value);
            }
        }
        Ok(overlay)
    }

    fn diff_field(
        &self,
        observed: Option<&Value>,
        desired: &Value,
        path: &mut Path,
    ) -> Result<Option<Value>> {
        if self.filter.is_excluded(path) {
            trace!(path = %path, "skipping excluded path");
            return Ok(None);
        }

        match (observed, desired) {
            (_, Value::Null) => {
                trace!(path = %path, "ignoring null in desired document");
                Ok(None)
            }
            (Some(Value::Map(observed)), Value::Map(desired)) => {
                let nested = self.diff_map(observed, desired, path)?;
                if nested.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Value::Map(nested)))
                }
            }
            (Some(observed), desired) if observed == desired => Ok(None),
            (_, Value::Map(desired)) => {
                Ok(self.replacement(desired, path)?.map(Value::Map))
            }
            (_, desired) => Ok(Some(desired.clone())),
        }
    }

    /// Copies a desired object that replaces whatever is observed, without
    /// excluded paths and nulls.
    ///
    /// An object that was empty in `desired` is kept as `{}`; one that only
    /// became empty through stripping is dropped.
    fn replacement(&self, desired: &Map, path: &mut Path) -> Result<Option<Map>> {
        self.check_depth(path)?;

        let mut copy = Map::new();
        for (key, value) in desired.iter() {
            path.push(PathElement::field_name(key.clone()));
            let kept = if self.filter.is_excluded(path) || value.is_null() {
                trace!(path = %path, "dropping field from replacement");
                None
            } else if let Value::Map(nested) = value {
                self.replacement(nested, path)?.map(Value::Map)
            } else {
                Some(value.clone())
            };
            path.pop();

            if let Some(value) = kept {
                copy.fields.insert(key.clone(), value);
            }
        }

        if copy.is_empty() && !desired.is_empty() {
            Ok(None)
        } else {
            Ok(Some(copy))
        }
    }

    fn check_depth(&self, path: &Path) -> Result<()> {
        if path.len() > self.max_depth {
            return Err(PatchError::malformed(
                path.to_string(),
                format!("nesting depth exceeds limit of {}", self.max_depth),
            ));
        }
        Ok(())
    }
}

/// Computes the overlay between two documents.
pub fn diff(observed: &Map, desired: &Map, filter: &dyn Filter) -> Result<Map> {
    Differ::new(filter).diff(observed, desired)
}

/// Computes the overlay with nothing excluded.
pub fn diff_all(observed: &Map, desired: &Map) -> Result<Map> {
    diff(observed, desired, &ExcludeFilter::default())
}
