//! Patch module - Encodes overlays as JSON merge patches, applies them, and
//! exposes the helper reconcilers use.

mod apply;
mod client;
mod encode;
mod helper;


pub use apply::*;
pub use client::*;
pub use encode::*;
pub use helper::*;
