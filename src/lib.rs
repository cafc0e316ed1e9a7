//! # Structured Merge Patch
//!
//! Computes the minimal JSON merge patch (RFC 7386) that aligns an observed
//! document with a desired one.
//!
//! The patch only adds or updates: fields that exist only in the observed
//! document (status, defaulted values, annotations owned by other actors) are
//! never touched, and an unchanged resource yields `{}` so that reconcilers can
//! skip the write altogether.
//!
//! ```
//! use structured_merge_patch::{from_json_str, MergePatchHelper, Options};
//!
//! let observed = from_json_str(r#"{"spec": {"replicas": 1}, "status": {"ready": 1}}"#).unwrap();
//! let desired = from_json_str(r#"{"spec": {"replicas": 3}}"#).unwrap();
//!
//! let patch = MergePatchHelper::new(&observed, &desired, &Options::default()).unwrap();
//! assert!(patch.has_changes());
//! assert_eq!(patch.patch_bytes(), br#"{"spec":{"replicas":3}}"#);
//! ```
//!
//! ## Modules
//!
//! - [`value`] - In-memory documents: objects, lists, typed maps and scalars
//! - [`fieldpath`] - Paths into documents and exclusion filters
//! - [`diff`] - Overlay computation between observed and desired documents
//! - [`patch`] - Patch encoding, application, and the reconciler facing helper
//! - [`config`] - Options for patch computation

pub mod config;
pub mod diff;
pub mod error;
pub mod fieldpath;
pub mod patch;
pub mod value;

pub use config::Options;
pub use diff::{diff, Differ};
pub use error::{PatchError, Result};
pub use fieldpath::{ExcludeFilter, Filter, Path, PathElement};
pub use patch::{merge_patch, MergePatchHelper, PatchClient};
pub use value::{from_json_str, from_yaml_str, Map, TypedMap, Value};
