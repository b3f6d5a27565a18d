//! Extraction adapter for fwdiff.
//!
//! Firmware packages are unpacked by an external tool (binwalk by default)
//! run as a child process. The tool decides where its output lands inside
//! the output directory; a [`RootLocator`] finds the real extraction root.
//!
//! # Key Types
//!
//! - [`Extractor`] / [`CommandExtractor`] -- Run an extraction backend
//! - [`RootLocator`] / [`SuffixLocator`] / [`OutputDirLocator`] -- Find the extraction root
//! - [`ExtractConfig`] -- Serializable backend configuration

pub mod config;
pub mod error;
pub mod extractor;
pub mod locate;

pub use config::ExtractConfig;
pub use error::{ExtractError, ExtractResult};
pub use extractor::{CommandExtractor, Extractor};
pub use locate::{OutputDirLocator, RootLocator, SuffixLocator};
