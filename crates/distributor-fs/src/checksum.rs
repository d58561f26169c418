//! SHA-256 checksum utilities
//!
//! Archive manifests record every file as `sha256:<hex>` so that an
//! unchanged mod set can be recognised without re-archiving.

use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";

/// Checksum of an in-memory buffer.
pub fn bytes_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}
