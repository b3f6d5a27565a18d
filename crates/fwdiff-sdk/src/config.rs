use std::path::Path;

use fwdiff_crypto::{ContentHasher, DigestAlgorithm};
use fwdiff_diff::{DirDiffer, TypeConflictPolicy};
use fwdiff_extract::ExtractConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Top-level configuration, loadable from TOML.
///
/// ```toml
/// [extract]
/// tool = "binwalk"
/// args = ["-e", "-C", "{output}", "{input}"]
/// root_suffix = ".extracted"
///
/// [diff]
/// algorithm = "sha256"
/// type_conflict = "changed"
/// expand_one_sided = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FwdiffConfig {
    pub extract: ExtractConfig,
    pub diff: DiffConfig,
}

impl FwdiffConfig {
    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| SdkError::Config(format!("{}: {}", path.display(), e)))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub algorithm: DigestAlgorithm,
    pub type_conflict: TypeConflictPolicy,
    pub expand_one_sided: bool,
}

impl DiffConfig {
    pub fn differ(&self) -> DirDiffer {
        DirDiffer::new()
            .with_hasher(ContentHasher::new(self.algorithm))
            .with_type_conflict(self.type_conflict)
            .with_expand_one_sided(self.expand_one_sided)
    }
}
