//! Reference collaborator backends
//!
//! Deterministic secp256k1 implementations of the [`KeyDeriver`] and
//! [`Signer`] boundaries. Production deployments swap these for SDK-backed
//! collaborators; these keep the crate usable end-to-end and hermetic under
//! test.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;

use crate::crypto::hash::sha256;
use crate::crypto::keys::KeyPair;
use crate::keychain::{DerivedKey, DeriverError, KeyDeriver, PrivateKeyMaterial};
use crate::seed::Seed;
use crate::signing::{Signer, SigningError};
use crate::transaction::{SignedTransaction, TransactionPrebuild};

/// Coins the reference deriver supports out of the box
const DEFAULT_COINS: [&str; 4] = ["btc", "eth", "xlm", "algo"];

/// Deterministic seed-to-keypair deriver over secp256k1
#[derive(Debug, Clone)]
pub struct EcdsaKeyDeriver {
    supported: BTreeSet<String>,
}

impl EcdsaKeyDeriver {
    /// Deriver accepting the default coin set
    pub fn new() -> Self {
        Self::with_coins(DEFAULT_COINS)
    }

    /// Deriver accepting only the given coin tickers
    pub fn with_coins<I, S>(coins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported: coins.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EcdsaKeyDeriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyDeriver for EcdsaKeyDeriver {
    async fn derive(&self, coin: &str, seed: &Seed) -> Result<DerivedKey, DeriverError> {
        if !self.supported.contains(coin) {
            return Err(DeriverError::UnsupportedCoin(coin.to_string()));
        }

        let pair = KeyPair::from_seed(coin, seed.as_bytes());
        Ok(DerivedKey {
            public_key: pair.public_key_hex(),
            address: pair.address(),
            private_key: PrivateKeyMaterial::new(pair.secret_key.secret_bytes().to_vec()),
        })
    }
}

/// ECDSA signer over the SHA-256 digest of the canonical prebuild bytes
#[derive(Debug, Default, Clone)]
pub struct EcdsaSigner;

impl EcdsaSigner {
    /// Create a signer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Signer for EcdsaSigner {
    async fn sign(
        &self,
        prebuild: &TransactionPrebuild,
        private_key: &PrivateKeyMaterial,
    ) -> Result<SignedTransaction, SigningError> {
        let pair = KeyPair::from_private_key_bytes(private_key.as_bytes())
            .map_err(|e| SigningError::Backend(e.to_string()))?;

        let digest = sha256(&prebuild.to_bytes()?);
        let signature = pair
            .sign(&digest)
            .map_err(|e| SigningError::Backend(e.to_string()))?;

        Ok(SignedTransaction {
            prebuild: prebuild.clone(),
            signature: hex::encode(signature),
            signer_public_key: pair.public_key_hex(),
            signed_at: Utc::now(),
        })
    }
}
