use std::path::{Path, PathBuf};

use fwdiff_diff::{ComparisonResult, DirDiffer};
use fwdiff_extract::{Extractor, RootLocator};
use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::FwdiffConfig;
use crate::error::{SdkError, SdkResult};

/// An archive unpacked into its own temporary directory.
///
/// The directory, and everything the extractor wrote into it, is deleted
/// when this value is dropped.
#[derive(Debug)]
pub struct ExtractedArchive {
    archive: PathBuf,
    root: PathBuf,
    workspace: TempDir,
}

impl ExtractedArchive {
    /// The archive that was extracted.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// The extraction root, inside [`Self::workspace`].
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The temporary directory handed to the extractor.
    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }
}

/// The outcome of comparing two archives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArchiveComparison {
    pub left: PathBuf,
    pub right: PathBuf,
    #[serde(flatten)]
    pub result: ComparisonResult,
}

/// Extracts two firmware packages and compares their contents.
pub struct FirmwareDiff {
    extractor: Box<dyn Extractor>,
    locator: Box<dyn RootLocator>,
    differ: DirDiffer,
}

impl std::fmt::Debug for FirmwareDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirmwareDiff")
            .field("extractor", &self.extractor.name())
            .field("differ", &self.differ)
            .finish()
    }
}

impl FirmwareDiff {
    /// Build from configuration.
    pub fn new(config: &FwdiffConfig) -> SdkResult<Self> {
        Ok(Self::with_backend(
            config.extract.extractor()?,
            config.extract.locator(),
            config.diff.differ(),
        ))
    }

    /// Build from explicit components, e.g. a non-binwalk extraction backend.
    pub fn with_backend(
        extractor: Box<dyn Extractor>,
        locator: Box<dyn RootLocator>,
        differ: DirDiffer,
    ) -> Self {
        Self {
            extractor,
            locator,
            differ,
        }
    }

    /// Extract one archive into a fresh temporary directory.
    pub fn extract(&self, archive: &Path) -> SdkResult<ExtractedArchive> {
        let workspace = tempfile::Builder::new()
            .prefix("fwdiff-")
            .tempdir()
            .map_err(SdkError::TempDir)?;

        self.extractor.extract(archive, workspace.path())?;
        let root = self.locator.locate(workspace.path())?;
        debug!(archive = %archive.display(), root = %root.display(), "extraction root resolved");

        Ok(ExtractedArchive {
            archive: archive.to_path_buf(),
            root,
            workspace,
        })
    }

    /// Extract both archives and compare their contents.
    ///
    /// Both temporary directories are released before this returns, on
    /// success and on every error path. The result lists are sorted.
    pub fn compare(&self, left: &Path, right: &Path) -> SdkResult<ArchiveComparison> {
        info!("extracting first file: {}", left.display());
        let left_tree = self.extract(left)?;
        info!("extracting second file: {}", right.display());
        let right_tree = self.extract(right)?;

        info!("comparing extracted contents");
        let result = self.differ.compare(left_tree.root(), right_tree.root())?.sorted();
        info!("comparison complete: {}", result.counts());

        Ok(ArchiveComparison {
            left: left.to_path_buf(),
            right: right.to_path_buf(),
            result,
        })
    }
}
