//! Canonical merge patch encoding.

use crate::error::{PatchError, Result};
use crate::value::{map_to_json_value, Map};

/// Encoding of an overlay with no changes.
pub const EMPTY_PATCH: &[u8] = b"{}";

/// Encodes an overlay as a JSON merge patch (RFC 7386).
///
/// Keys are emitted in sorted order, so equal overlays always produce
/// byte-identical patches.
pub fn encode(overlay: &Map) -> Result<Vec<u8>> {
    let json = map_to_json_value(overlay)?;
    serde_json::to_vec(&json).map_err(|e| PatchError::EncodingFailure(e.to_string()))
}

/// Returns true if the encoded patch changes anything.
pub fn has_changes(patch: &[u8]) -> bool {
    patch != EMPTY_PATCH
}
