//! High-level API for fwdiff.
//!
//! [`FirmwareDiff`] extracts two firmware packages into scoped temporary
//! directories, compares the extracted trees, and returns the classification.
//! Temporary directories are removed when the comparison finishes, whether it
//! succeeded or not.

pub mod config;
pub mod error;
pub mod session;

pub use config::{DiffConfig, FwdiffConfig};
pub use error::{SdkError, SdkResult};
pub use session::{ArchiveComparison, ExtractedArchive, FirmwareDiff};

// Re-export key types
pub use fwdiff_crypto::{ContentHasher, DigestAlgorithm};
pub use fwdiff_diff::{Category, ComparisonResult, DirDiffer, Summary, TypeConflictPolicy};
pub use fwdiff_extract::{CommandExtractor, ExtractConfig, Extractor, RootLocator, SuffixLocator};
