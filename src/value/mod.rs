//! Value module - In-memory representation of observed and desired documents.
//!
//! Documents are trees of generic objects, arrays, typed maps and scalars.
//! Only generic objects are recursed into when diffing.

mod convert;
mod value;

pub use convert::*;
pub use value::*;
