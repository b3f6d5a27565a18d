use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use crate::digest::Digest;

/// The digest algorithm used to compare file contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256.
    #[default]
    Sha256,
    /// BLAKE3 (256-bit output).
    Blake3,
}

impl DigestAlgorithm {
    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(format!("unknown digest algorithm: {other}")),
        }
    }
}

/// Whole-content file hasher.
///
/// Unlike a streaming hasher, [`ContentHasher::hash_file`] reads the file in
/// a single buffered call and digests the bytes at once. Read failures are
/// returned unchanged so the caller can attach the path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentHasher {
    algorithm: DigestAlgorithm,
}

impl ContentHasher {
    /// SHA-256 hasher.
    pub const SHA256: Self = Self {
        algorithm: DigestAlgorithm::Sha256,
    };
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self {
        algorithm: DigestAlgorithm::Blake3,
    };

    /// Create a hasher for the given algorithm.
    pub const fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The algorithm used by this hasher.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Hash raw bytes.
    pub fn hash(&self, data: &[u8]) -> Digest {
        match self.algorithm {
            DigestAlgorithm::Sha256 => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&sha2::Sha256::digest(data));
                Digest::from_hash(out)
            }
            DigestAlgorithm::Blake3 => Digest::from_hash(*blake3::hash(data).as_bytes()),
        }
    }

    /// Hash the entire contents of the file at `path`.
    pub fn hash_file(&self, path: &Path) -> std::io::Result<Digest> {
        let data = std::fs::read(path)?;
        Ok(self.hash(&data))
    }
}
