//! Shared helpers for lifecycle tests

// The unit tests and these integration tests share one HTTP mock
#[path = "../../src/test_support.rs"]
#[allow(dead_code)]
mod test_support;

pub use test_support::MockServer;

/// Decompress a gzip JSON-lines artifact
pub fn gunzip_lines(bytes: &[u8]) -> Vec<serde_json::Value> {
    use std::io::BufRead;
    let reader = std::io::BufReader::new(flate2::read::GzDecoder::new(bytes));
    reader
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
        .collect()
}

/// Hex sha256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    format!("{:x}", Sha256::digest(bytes))
}
