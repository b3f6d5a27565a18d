use serde::{Deserialize, Serialize};

use crate::error::ExtractResult;
use crate::extractor::{CommandExtractor, Extractor};
use crate::locate::{OutputDirLocator, RootLocator, SuffixLocator};

/// Extraction backend settings.
///
/// `root_suffix` selects the [`SuffixLocator`]; an empty suffix means the
/// output directory is used as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub tool: String,
    pub args: Vec<String>,
    pub root_suffix: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            tool: "binwalk".into(),
            args: CommandExtractor::binwalk_args(),
            root_suffix: SuffixLocator::BINWALK_SUFFIX.into(),
        }
    }
}

impl ExtractConfig {
    pub fn extractor(&self) -> ExtractResult<Box<dyn Extractor>> {
        Ok(Box::new(CommandExtractor::new(
            self.tool.clone(),
            self.args.clone(),
        )?))
    }

    pub fn locator(&self) -> Box<dyn RootLocator> {
        if self.root_suffix.is_empty() {
            Box::new(OutputDirLocator)
        } else {
            Box::new(SuffixLocator::new(self.root_suffix.clone()))
        }
    }
}
