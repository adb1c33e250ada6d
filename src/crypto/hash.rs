//! Cryptographic hashing utilities
//!
//! Provides SHA-256 based hashing used for key derivation, prebuild
//! digests, and address checksums.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
/// Used for Base58Check address checksums
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}
