//! Content-addressed row identifiers.

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in an id (128 bits).
const ID_BYTES: usize = 16;

/// Derive the id for a row from its text and serialized metadata.
///
/// The id is the first 128 bits of SHA-256 over `"{text}-{metadata_json}"`,
/// rendered as 32 lowercase hex characters. Pure and stable across runs.
pub fn content_id(text: &str, metadata_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(b"-");
    hasher.update(metadata_json.as_bytes());
    let digest = hasher.finalize();

    digest[..ID_BYTES]
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
