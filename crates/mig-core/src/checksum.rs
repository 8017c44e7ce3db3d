//! SHA-256 checksums for detecting edits to applied migrations.

use sha2::{Digest, Sha256};

/// Number of hex characters shown by [`short_checksum`].
const SHORT_LEN: usize = 12;

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Abbreviated checksum for log lines and error messages.
pub fn short_checksum(s: &str) -> String {
    let mut full = compute_checksum(s);
    full.truncate(SHORT_LEN);
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            compute_checksum(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_short_checksum_is_prefix() {
        let sql = "CREATE TABLE users (id INTEGER);";
        let short = short_checksum(sql);
        assert_eq!(short.len(), 12);
        assert!(compute_checksum(sql).starts_with(&short));
    }
}
