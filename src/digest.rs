//! Content hashing for definition files.

use sha2::{Digest, Sha256};

/// Number of hex characters kept for a content-derived version.
pub const FALLBACK_VERSION_LEN: usize = 8;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Version used when a definition does not author one: the digest prefix.
pub fn fallback_version(digest_hex: &str) -> String {
    digest_hex.chars().take(FALLBACK_VERSION_LEN).collect()
}
