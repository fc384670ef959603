// Hash helpers for correlation attribute values
//
// Central repository file attributes are MD5 hex strings. The MD5 of empty
// input marks files with no content and never counts as a common value.

use std::sync::OnceLock;

use md5::{Digest, Md5};

/// Length of an MD5 digest in hex characters
pub const MD5_HEX_LENGTH: usize = 32;

/// Compute the lowercase hex MD5 of a byte slice
pub fn compute_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// MD5 of zero-length content
pub fn no_data_md5() -> &'static str {
    static NO_DATA: OnceLock<String> = OnceLock::new();
    NO_DATA.get_or_init(|| compute_md5(&[]))
}

/// Whether the value is the MD5 of zero-length content
pub fn is_no_data_md5(md5: &str) -> bool {
    hashes_match(md5, no_data_md5())
}

/// Check the value is a well-formed MD5 hex string
pub fn is_valid_md5(md5: &str) -> bool {
    md5.len() == MD5_HEX_LENGTH && md5.chars().all(|c| c.is_ascii_hexdigit())
}

/// Compare two hashes (case-insensitive)
pub fn hashes_match(hash1: &str, hash2: &str) -> bool {
    hash1.eq_ignore_ascii_case(hash2)
}
