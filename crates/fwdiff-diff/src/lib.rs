//! Directory diff engine for fwdiff.
//!
//! Compares two directory trees by path and file content, classifying every
//! relative path as added, removed, changed, or unchanged.
//!
//! # Key Types
//!
//! - [`ComparisonResult`] / [`Category`] -- Four-way classification of relative paths
//! - [`DirDiffer`] / [`TypeConflictPolicy`] -- Recursive comparison with its options
//! - [`DiffError`] -- Failures surfaced while walking or hashing

pub mod dir_diff;
pub mod error;
pub mod result;

pub use dir_diff::{compare_dirs, DirDiffer, EntryKind, TypeConflictPolicy};
pub use error::{DiffError, DiffResult};
pub use result::{Category, ComparisonResult, Summary};
