//! Boundary to the resource store that receives merge patches.

use crate::value::Map;

/// PatchClient sends a merge patch to wherever the observed document lives.
///
/// Implementations own transport, authentication and optimistic concurrency;
/// the engine only decides whether and what to send.
pub trait PatchClient {
    type Error: std::error::Error;

    /// Sends `patch` (an RFC 7386 JSON merge patch) for the resource whose
    /// last observed state is `original`.
    fn merge_patch(&self, original: &Map, patch: &[u8]) -> Result<(), Self::Error>;
}
