//! Transaction signing
//!
//! Applies the user's signature to a verified prebuild. Ordering is owned by
//! the session facade: the signer runs only after verification succeeds, and
//! the key material is always the already-derived primary identity's.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::keychain::PrivateKeyMaterial;
use crate::transaction::{SignedTransaction, TransactionPrebuild};

/// Errors raised while signing a prebuild
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Prebuild could not be encoded for signing: {0}")]
    MalformedPrebuild(#[from] serde_json::Error),
    #[error("Signing backend failed: {0}")]
    Backend(String),
}

/// Produces a signature over a prebuild with the supplied private key.
///
/// Implementations carry the coin-specific signature scheme; failures are
/// surfaced to the caller as-is, never retried here.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(
        &self,
        prebuild: &TransactionPrebuild,
        private_key: &PrivateKeyMaterial,
    ) -> Result<SignedTransaction, SigningError>;
}

/// Applies the local half of the multi-party signature
pub struct TransactionSigner {
    signer: Arc<dyn Signer>,
}

impl TransactionSigner {
    /// Create a signer over the given backend
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self { signer }
    }

    /// Sign a verified prebuild with the primary identity's key material
    pub async fn sign(
        &self,
        prebuild: &TransactionPrebuild,
        private_key: &PrivateKeyMaterial,
    ) -> Result<SignedTransaction, SigningError> {
        let signed = self.signer.sign(prebuild, private_key).await?;
        log::debug!("prebuild half-signed by {}", signed.signer_public_key);
        Ok(signed)
    }
}
