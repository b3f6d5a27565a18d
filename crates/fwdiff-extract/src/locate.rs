use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ExtractError, ExtractResult};

/// Strategy for finding the extraction root inside an extractor's output directory.
pub trait RootLocator: Send + Sync {
    fn locate(&self, output_dir: &Path) -> ExtractResult<PathBuf>;
}

/// Picks the first subdirectory whose name ends with a suffix.
///
/// binwalk writes into `_<archive name>.extracted`, so the default suffix is
/// `.extracted`. Candidates are taken in name order. When none match, the
/// output directory itself is the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuffixLocator {
    suffix: String,
}

impl SuffixLocator {
    pub const BINWALK_SUFFIX: &'static str = ".extracted";

    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for SuffixLocator {
    fn default() -> Self {
        Self::new(Self::BINWALK_SUFFIX)
    }
}

impl RootLocator for SuffixLocator {
    fn locate(&self, output_dir: &Path) -> ExtractResult<PathBuf> {
        let io_err = |source| ExtractError::Io {
            path: output_dir.to_path_buf(),
            source,
        };

        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(output_dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(&self.suffix) && entry.path().is_dir() {
                candidates.push(name);
            }
        }
        candidates.sort();

        match candidates.first() {
            Some(name) => {
                if candidates.len() > 1 {
                    debug!(chosen = %name, count = candidates.len(), "multiple extraction roots, using first");
                }
                Ok(output_dir.join(name))
            }
            None => {
                debug!(dir = %output_dir.display(), suffix = %self.suffix, "no suffixed directory, using output dir");
                Ok(output_dir.to_path_buf())
            }
        }
    }
}

/// Treats the output directory as the extraction root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputDirLocator;

impl RootLocator for OutputDirLocator {
    fn locate(&self, output_dir: &Path) -> ExtractResult<PathBuf> {
        Ok(output_dir.to_path_buf())
    }
}
