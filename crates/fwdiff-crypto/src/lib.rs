//! Content hashing for fwdiff.
//!
//! Files are compared by a 256-bit digest of their full contents. Two
//! algorithms are available: SHA-256 (the default) and BLAKE3.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod digest;
pub mod hasher;

pub use digest::Digest;
pub use hasher::{ContentHasher, DigestAlgorithm};
