use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("extraction failed")]
    Extract(#[from] fwdiff_extract::ExtractError),

    #[error("comparison failed")]
    Diff(#[from] fwdiff_diff::DiffError),

    #[error("failed to create temporary directory")]
    TempDir(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error")]
    Io(#[from] io::Error),
}

impl SdkError {
    /// Returns `true` if the external extractor could not process an input.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, Self::Extract(_))
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
