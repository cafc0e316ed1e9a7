//! Merge patch application.

use std::borrow::Cow;

use crate::error::{PatchError, Result};
use crate::fieldpath::{Path, PathElement};
use crate::value::{Map, Value};

/// Applies a JSON merge patch (RFC 7386) to a target value.
///
/// Objects merge recursively, `null` deletes the key, and any other patch value
/// replaces the target value, lists included. Typed maps are objects on the
/// wire, so they merge key by key here too and come out as generic maps.
pub fn merge_patch(target: &Value, patch: &Value) -> Value {
    match as_object(patch) {
        Some(patch_map) => {
            let mut merged = as_object(target).map(Cow::into_owned).unwrap_or_default();
            for (key, patch_value) in patch_map.iter() {
                if patch_value.is_null() {
                    merged.delete(key);
                    continue;
                }
                let existing = merged.get(key).cloned().unwrap_or(Value::Null);
                merged.set(key.clone(), merge_patch(&existing, patch_value));
            }
            Value::Map(merged)
        }
        None => patch.clone(),
    }
}

/// Views a value the way it reads once encoded: maps and typed maps are both
/// JSON objects.
fn as_object(value: &Value) -> Option<Cow<'_, Map>> {
    match value {
        Value::Map(m) => Some(Cow::Borrowed(m)),
        Value::TypedMap(m) => Some(Cow::Owned(m.to_map())),
        _ => None,
    }
}

/// Applies an overlay computed against `observed` to a live `target`.
///
/// Wherever the overlay was produced by recursing into an object of
/// `observed`, `target` must still hold an object at that path: the overlay
/// only carries the changed keys, so merging it into anything else would lose
/// data. Such mismatches are reported as [`PatchError::ApplyConflict`].
/// Everything else follows [`merge_patch`].
pub fn apply_overlay(observed: &Map, overlay: &Map, target: &Value) -> Result<Value> {
    let mut result = match target {
        Value::Map(m) => m.clone(),
        other => {
            return Err(PatchError::conflict(
                Path::new().to_string(),
                format!("target must be an object, got {}", other.type_name()),
            ))
        }
    };
    merge_checked(Some(observed), overlay, &mut result, &mut Path::new())?;
    Ok(Value::Map(result))
}

fn merge_checked(
    observed: Option<&Map>,
    overlay: &Map,
    target: &mut Map,
    path: &mut Path,
) -> Result<()> {
    for (key, patch_value) in overlay.iter() {
        path.push(PathElement::field_name(key.clone()));
        let observed_value = observed.and_then(|o| o.get(key));

        match (observed_value, patch_value) {
            (Some(Value::Map(observed_map)), Value::Map(patch_map)) => match target.get_mut(key) {
                Some(Value::Map(target_map)) => {
                    merge_checked(Some(observed_map), patch_map, target_map, path)?
                }
                Some(Value::TypedMap(typed)) => {
                    let mut target_map = typed.to_map();
                    merge_checked(Some(observed_map), patch_map, &mut target_map, path)?;
                    target.set(key.clone(), target_map);
                }
                Some(other) => {
                    return Err(PatchError::conflict(
                        path.to_string(),
                        format!("expected an object, target holds {}", other.type_name()),
                    ))
                }
                None => {
                    return Err(PatchError::conflict(
                        path.to_string(),
                        "object was removed from the target",
                    ))
                }
            },
            (_, Value::Null) => {
                target.delete(key);
            }
            (_, value) => {
                let existing = target.get(key).cloned().unwrap_or(Value::Null);
                target.set(key.clone(), merge_patch(&existing, value));
            }
        }

        path.pop();
    }
    Ok(())
}
