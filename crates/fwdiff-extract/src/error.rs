use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors produced while extracting an archive.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The input archive does not exist or is not a regular file.
    #[error("archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// The extraction tool could not be started (usually not installed).
    #[error("failed to run {tool}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The extraction tool ran and exited unsuccessfully.
    #[error("{tool} failed on {} ({status}): {stderr}", archive.display())]
    ToolFailed {
        tool: String,
        archive: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    /// Filesystem error while preparing or inspecting the output directory.
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configured argument template cannot produce a usable command line.
    #[error("invalid argument template: {0}")]
    InvalidTemplate(String),
}

/// Convenience alias used throughout the extract crate.
pub type ExtractResult<T> = Result<T, ExtractError>;
