// Common utilities shared by the search and data source modules

pub mod audit;
pub mod hash;

// Re-exports for convenience
pub use hash::{compute_md5, hashes_match, is_no_data_md5, is_valid_md5, no_data_md5};

/// Normalize a recorded file path to forward slashes
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Case-insensitive string comparison
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}
