//! Checksums for downloaded component archives.
//!
//! The registry checksums were produced from the archive's base64 text, not
//! its raw bytes, so verification hashes the base64 representation and
//! base64-encodes the digest.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// SHA256 of `text`, returned base64 encoded.
///
/// # Examples
///
/// ```
/// # use notes_components::hash_utils::sha256_base64;
/// let digest = sha256_base64("hello world");
/// assert_eq!(digest.len(), 44);
/// ```
pub fn sha256_base64(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Base64 text of raw archive bytes, as the filesystem gateway reads it.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Checksum of an archive given its raw bytes.
pub fn archive_checksum(bytes: &[u8]) -> String {
    sha256_base64(&encode_base64(bytes))
}

/// Exact, case-sensitive comparison against an optional expected value.
///
/// A missing expected checksum never matches.
pub fn checksum_matches(expected: Option<&str>, actual: &str) -> bool {
    expected.is_some_and(|expected| expected == actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_base64_known_value() {
        // SHA256("hello world") = b94d27b9...cde9
        assert_eq!(
            sha256_base64("hello world"),
            "uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
        );
    }

    #[test]
    fn test_archive_checksum_hashes_base64_text() {
        let bytes = b"PK\x03\x04 not really a zip";
        let direct = sha256_base64(&encode_base64(bytes));
        assert_eq!(archive_checksum(bytes), direct);

        let mut raw = Sha256::new();
        raw.update(bytes);
        assert_ne!(archive_checksum(bytes), STANDARD.encode(raw.finalize()));
    }

    #[test]
    fn test_checksum_matches_is_exact() {
        assert!(checksum_matches(Some("AAA="), "AAA="));
        assert!(!checksum_matches(Some("AAA="), "aaa="));
        assert!(!checksum_matches(Some("AAA="), "BBB="));
        assert!(!checksum_matches(None, "AAA="));
    }
}
