//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - Deterministic ECDSA key derivation and signing (secp256k1)
//! - Reference collaborator backends for derivation and signing

pub mod backend;
pub mod hash;
pub mod keys;

pub use backend::{EcdsaKeyDeriver, EcdsaSigner};
pub use hash::{double_sha256, sha256};
pub use keys::{
    public_key_from_hex, public_key_to_address, sign_message, verify_signature, KeyError, KeyPair,
};
