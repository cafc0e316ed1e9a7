//! MergePatchHelper, the entry point used by reconcilers.

use super::apply::apply_overlay;
use super::client::PatchClient;
use super::encode::{encode, has_changes};
use crate::config::Options;
use crate::diff::Differ;
use crate::error::{PatchError, Result};
use crate::value::{from_json_value_with_depth, Map, Value};
use tracing::debug;

/// MergePatchHelper holds the merge patch that aligns an observed document to
/// a desired one.
///
/// It is built once per reconciliation: the caller checks
/// [`has_changes`](Self::has_changes) and only writes when it is true, so
/// unchanged resources never receive no-op writes.
#[derive(Debug, Clone)]
pub struct MergePatchHelper {
    original: Map,
    overlay: Map,
    data: Vec<u8>,
}

impl MergePatchHelper {
    /// Computes the patch from `observed` to `desired`.
    ///
    /// Both documents must be objects at the root.
    pub fn new(observed: &Value, desired: &Value, options: &Options) -> Result<Self> {
        options.validate()?;
        let original = root_map(observed, "observed")?;
        let desired = root_map(desired, "desired")?;

        let filter = options.filter()?;
        let overlay = Differ::new(&filter)
            .with_max_depth(options.max_depth)
            .diff(original, desired)?;
        let data = encode(&overlay)?;

        debug!(
            changed_fields = overlay.len(),
            patch_bytes = data.len(),
            has_changes = has_changes(&data),
            "computed merge patch"
        );

        Ok(MergePatchHelper {
            original: original.clone(),
            overlay,
            data,
        })
    }

    /// Computes the patch from decoded JSON documents.
    pub fn from_json(
        observed: &serde_json::Value,
        desired: &serde_json::Value,
        options: &Options,
    ) -> Result<Self> {
        let observed = from_json_value_with_depth(observed, options.max_depth)?;
        let desired = from_json_value_with_depth(desired, options.max_depth)?;
        MergePatchHelper::new(&observed, &desired, options)
    }

    /// Returns true if the patch changes anything.
    pub fn has_changes(&self) -> bool {
        has_changes(&self.data)
    }

    /// Returns the encoded JSON merge patch.
    pub fn patch_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the overlay the patch was encoded from.
    pub fn overlay(&self) -> &Map {
        &self.overlay
    }

    /// Merges the patch into a live target document.
    ///
    /// Fails with [`PatchError::ApplyConflict`] if the target no longer
    /// holds an object where the patch expects to merge into one; the caller
    /// should re-fetch and recompute.
    pub fn apply(&self, target: &Value) -> Result<Value> {
        apply_overlay(&self.original, &self.overlay, target)
    }

    /// Sends the patch through `client` if there is anything to change.
    ///
    /// Returns whether a write was issued.
    pub fn patch<C: PatchClient + ?Sized>(&self, client: &C) -> std::result::Result<bool, C::Error> {
        if !self.has_changes() {
            debug!("skipping no-op merge patch");
            return Ok(false);
        }
        client.merge_patch(&self.original, &self.data)?;
        Ok(true)
    }
}

fn root_map<'a>(value: &'a Value, role: &str) -> Result<&'a Map> {
    value.as_map().ok_or_else(|| {
        PatchError::malformed(
            "<root>",
            format!("{} document must be an object, got {}", role, value.type_name()),
        )
    })
}
