use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::constants::USER_AGENT;

/// Verifies the integrity of a downloaded binary using a SHA-256 checksum.
///
/// Checksum sidecars are plain text files whose first whitespace-delimited
/// token is the hex digest (the common `"<hash>  <filename>"` convention is
/// tolerated). Comparison is case-insensitive.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Compute the SHA-256 digest of a file as lowercase hex.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read.
    pub async fn compute_sha256(file_path: &Path) -> Result<String> {
        debug!("Computing SHA-256 checksum for {}", file_path.display());

        let contents = fs::read(file_path)
            .await
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Fetch the expected digest from a checksum sidecar URL.
    ///
    /// Returns `None` when the sidecar cannot be fetched or contains no
    /// token. A missing sidecar is not fatal to an update - the caller
    /// proceeds unverified and warns the user.
    pub async fn fetch_expected(client: &reqwest::Client, url: &str) -> Option<String> {
        debug!("Fetching checksum from {url}");

        let response = match client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("Error fetching checksum: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Failed to fetch checksum: HTTP {}", response.status());
            return None;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to read checksum body: {e}");
                return None;
            }
        };

        parse_checksum_body(&body)
    }

    /// Verify a file against an expected hex digest, case-insensitively.
    ///
    /// Read errors degrade to `false` with a debug log; this function never
    /// fails across its boundary.
    pub async fn verify(file_path: &Path, expected_hex: &str) -> bool {
        match Self::compute_sha256(file_path).await {
            Ok(actual) => digest_matches(expected_hex, &actual),
            Err(e) => {
                debug!("Checksum verification error: {e:#}");
                false
            }
        }
    }
}

/// Compare an expected digest against a computed one, ignoring case and
/// surrounding whitespace. The single comparison rule shared by every
/// caller that checks a digest.
#[must_use]
pub fn digest_matches(expected: &str, actual: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

/// Extract the digest token from a checksum sidecar body: the first
/// whitespace-delimited token, lowercased.
pub(crate) fn parse_checksum_body(body: &str) -> Option<String> {
    body.split_whitespace()
        .next()
        .map(|token| token.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_compute_sha256() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"Hello, World!").unwrap();

        let checksum = ChecksumVerifier::compute_sha256(temp_file.path()).await.unwrap();

        // Known SHA-256 of "Hello, World!"
        assert_eq!(
            checksum,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[tokio::test]
    async fn test_verify_matches_own_digest() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"Test content").unwrap();

        let actual = ChecksumVerifier::compute_sha256(temp_file.path()).await.unwrap();
        assert!(ChecksumVerifier::verify(temp_file.path(), &actual).await);
    }

    #[tokio::test]
    async fn test_verify_rejects_other_digest() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"Test content").unwrap();

        let wrong = "0000000000000000000000000000000000000000000000000000000000000000";
        assert!(!ChecksumVerifier::verify(temp_file.path(), wrong).await);
    }

    #[tokio::test]
    async fn test_verify_is_case_insensitive() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"Test").unwrap();

        // SHA-256 of "Test"
        let lowercase = "532eaabd9574880dbf76b9b8cc00832c20a6ec113d682299550d7a6e0f345e25";
        let uppercase = "532EAABD9574880DBF76B9B8CC00832C20A6EC113D682299550D7A6E0F345E25";

        assert!(ChecksumVerifier::verify(temp_file.path(), lowercase).await);
        assert!(ChecksumVerifier::verify(temp_file.path(), uppercase).await);
    }

    #[tokio::test]
    async fn test_verify_missing_file_is_false() {
        let path = Path::new("/nonexistent/unipm-download");
        assert!(!ChecksumVerifier::verify(path, "abcd").await);
    }

    #[test]
    fn test_digest_matches_ignores_case_and_whitespace() {
        assert!(digest_matches("ABC123", "abc123"));
        assert!(digest_matches("abc123\n", "  abc123"));
        assert!(!digest_matches("abc123", "abc124"));
    }

    #[test]
    fn test_parse_checksum_body_formats() {
        // Bare digest
        assert_eq!(parse_checksum_body("abc123\n").as_deref(), Some("abc123"));
        // "<hash>  <filename>" convention
        assert_eq!(
            parse_checksum_body("ABC123  unipm-linux-x64\n").as_deref(),
            Some("abc123")
        );
        // Empty body
        assert_eq!(parse_checksum_body("   \n"), None);
    }
}
