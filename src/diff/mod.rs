//! Diff module - Computes the minimal overlay between an observed and a
//! desired document.

mod differ;

#[cfg(test)]
mod diff_test;

pub use differ::*;
