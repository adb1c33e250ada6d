//! Key identity types

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Role a derived key identity plays within the wallet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRole {
    /// Derived directly from the caller's seed; holds the local signing key
    Primary,
    /// Derived from the perturbed seed; reserved for recovery
    Backup,
}

impl std::fmt::Display for KeyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyRole::Primary => write!(f, "primary"),
            KeyRole::Backup => write!(f, "backup"),
        }
    }
}

/// Secret key bytes for a derived identity.
///
/// Zeroized on drop and redacted from debug output. Never serialized.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyMaterial(Vec<u8>);

impl PrivateKeyMaterial {
    /// Wrap raw secret bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw secret bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// Implement Debug manually to keep secret bytes out of logs
impl std::fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PrivateKeyMaterial")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// A derived public/private key identity
#[derive(Clone, Debug)]
pub struct KeyIdentity {
    /// Role this identity plays in the signer set
    pub role: KeyRole,
    /// Public key (hex, compressed)
    pub public_key: String,
    /// Address derived from the public key
    pub address: String,
    /// Secret material; present for locally derived identities
    pub private_key: Option<PrivateKeyMaterial>,
}

/// The custodian's key identity.
///
/// Supplied by the caller, obtained out-of-band from the custodian service;
/// never derived locally.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustodianIdentity {
    /// Public key (hex)
    pub public_key: String,
}

impl CustodianIdentity {
    /// Wrap a custodian public key
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
        }
    }
}
