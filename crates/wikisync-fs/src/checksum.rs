//! Body fingerprints for logs and plan diagnostics

use sha2::{Digest, Sha256};

/// Fingerprint a page body as `sha256:<hex>`.
///
/// Callers hash normalized storage markup so that two bodies which compare
/// equal during planning also share a fingerprint.
pub fn compute_content_checksum(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("sha256:{}", hex::encode(digest))
}
