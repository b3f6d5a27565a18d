//! Error types for the diff crate.

use std::io;
use std::path::PathBuf;

use crate::dir_diff::EntryKind;

/// Errors that can occur during directory comparison.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A directory could not be listed or walked.
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be read for hashing.
    #[error("failed to hash {}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A name has a different entry kind on each side.
    #[error("type conflict at {path}: {left} on the left, {right} on the right")]
    TypeConflict {
        path: String,
        left: EntryKind,
        right: EntryKind,
    },
}

impl DiffError {
    /// Re-root a relative path carried by this error under `prefix`.
    pub(crate) fn under(self, prefix: &str) -> Self {
        match self {
            Self::TypeConflict { path, left, right } => Self::TypeConflict {
                path: crate::result::join_rel(prefix, &path),
                left,
                right,
            },
            other => other,
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
