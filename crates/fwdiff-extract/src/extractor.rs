use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{ExtractError, ExtractResult};

/// An extraction backend.
///
/// Implementations block until extraction finishes. On success the output
/// directory is populated in whatever layout the backend uses; pair the
/// extractor with a [`RootLocator`](crate::RootLocator) to find the files.
pub trait Extractor: Send + Sync {
    /// Short name for logs and error messages.
    fn name(&self) -> &str;

    /// Extract `archive` into `output_dir`.
    fn extract(&self, archive: &Path, output_dir: &Path) -> ExtractResult<()>;
}

/// Runs an external program with a templated argument list.
///
/// `{input}` and `{output}` in the template are replaced with the archive
/// path and the output directory. An argument that is exactly a placeholder
/// is passed through as the raw OS path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    pub const INPUT: &'static str = "{input}";
    pub const OUTPUT: &'static str = "{output}";

    /// Create an extractor for `program` with an argument template.
    ///
    /// The template must reference `{input}`, otherwise the tool would never
    /// see the archive.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> ExtractResult<Self> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(ExtractError::InvalidTemplate("empty program name".into()));
        }
        if !args.iter().any(|a| a.contains(Self::INPUT)) {
            return Err(ExtractError::InvalidTemplate(format!(
                "arguments for {program} never mention {}",
                Self::INPUT
            )));
        }
        Ok(Self { program, args })
    }

    /// `binwalk -e -C {output} {input}`.
    pub fn binwalk() -> Self {
        Self {
            program: "binwalk".into(),
            args: Self::binwalk_args(),
        }
    }

    pub(crate) fn binwalk_args() -> Vec<String> {
        ["-e", "-C", Self::OUTPUT, Self::INPUT]
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument list for one invocation, placeholders substituted.
    pub fn command_args(&self, archive: &Path, output_dir: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                Self::INPUT => archive.as_os_str().to_owned(),
                Self::OUTPUT => output_dir.as_os_str().to_owned(),
                templated => templated
                    .replace(Self::INPUT, &archive.to_string_lossy())
                    .replace(Self::OUTPUT, &output_dir.to_string_lossy())
                    .into(),
            })
            .collect()
    }
}

impl Extractor for CommandExtractor {
    fn name(&self) -> &str {
        &self.program
    }

    fn extract(&self, archive: &Path, output_dir: &Path) -> ExtractResult<()> {
        if !archive.is_file() {
            return Err(ExtractError::ArchiveNotFound(archive.to_path_buf()));
        }
        std::fs::create_dir_all(output_dir).map_err(|source| ExtractError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let args = self.command_args(archive, output_dir);
        debug!(tool = %self.program, ?args, "running extractor");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ExtractError::Spawn {
                tool: self.program.clone(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(tool = %self.program, "{}", line);
        }

        if !output.status.success() {
            return Err(ExtractError::ToolFailed {
                tool: self.program.clone(),
                archive: archive.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
