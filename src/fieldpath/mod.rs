//! Field path module - Addresses locations in documents and decides which of
//! them are excluded from comparison.

mod filter;
mod path;
mod set;

pub use filter::*;
pub use path::*;
pub use set::*;
