//! Content digests
//!
//! Pages are identified by the SHA-256 of their body, hex encoded.

use sha2::{Digest, Sha256};

/// Computes a deterministic, fixed-length digest of page content
pub trait ContentHasher: Send + Sync + 'static {
    fn digest(&self, content: &[u8]) -> String;
}

/// SHA-256 hasher producing 64 lowercase hex characters
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn digest(&self, content: &[u8]) -> String {
        sha256_hex(content)
    }
}

/// Hex-encoded SHA-256 of `content`
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
