//! Seed-to-keychain derivation
//!
//! Wraps a [`KeyDeriver`] backend and applies the wallet's role rules: the
//! primary identity comes directly from the seed, the backup identity from
//! the deterministically perturbed seed. The two are guaranteed to never
//! share a public key.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::keychain::identity::{KeyIdentity, KeyRole, PrivateKeyMaterial};
use crate::seed::Seed;

/// Error reported by a [`KeyDeriver`] backend
#[derive(Error, Debug)]
pub enum DeriverError {
    #[error("Unsupported coin type: {0}")]
    UnsupportedCoin(String),
    #[error("{0}")]
    Backend(String),
}

/// Errors raised during keychain derivation
#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("Derivation failed for {role} key on coin {coin}: {source}")]
    Backend {
        coin: String,
        role: KeyRole,
        #[source]
        source: DeriverError,
    },
    #[error("Primary and backup identities collide for coin {coin}")]
    IdentityCollision { coin: String },
}

/// Raw output of a [`KeyDeriver`] backend
#[derive(Debug)]
pub struct DerivedKey {
    /// Public key (hex, compressed)
    pub public_key: String,
    /// Address derived from the public key
    pub address: String,
    /// Secret key material
    pub private_key: PrivateKeyMaterial,
}

/// Derives a public/private key pair from seed bytes.
///
/// Implementations must be deterministic: the same coin and seed always
/// produce the same key pair. Unsupported coin types are rejected.
#[async_trait]
pub trait KeyDeriver: Send + Sync {
    async fn derive(&self, coin: &str, seed: &Seed) -> Result<DerivedKey, DeriverError>;
}

/// Derives primary and backup identities from a single seed
pub struct KeychainDeriver {
    deriver: Arc<dyn KeyDeriver>,
}

impl KeychainDeriver {
    /// Create a deriver over the given backend
    pub fn new(deriver: Arc<dyn KeyDeriver>) -> Self {
        Self { deriver }
    }

    /// Derive a single identity for the given role.
    ///
    /// Backup identities come from the perturbed seed so the user and backup
    /// keys can never be identical; custodian policy refuses wallets where
    /// they are.
    pub async fn derive(
        &self,
        coin: &str,
        seed: &Seed,
        role: KeyRole,
    ) -> Result<KeyIdentity, DerivationError> {
        let derivation_seed = match role {
            KeyRole::Primary => seed.clone(),
            KeyRole::Backup => seed.perturbed(),
        };

        let key = self
            .deriver
            .derive(coin, &derivation_seed)
            .await
            .map_err(|source| DerivationError::Backend {
                coin: coin.to_string(),
                role,
                source,
            })?;

        log::debug!("derived {} identity for coin {}", role, coin);

        Ok(KeyIdentity {
            role,
            public_key: key.public_key,
            address: key.address,
            private_key: Some(key.private_key),
        })
    }

    /// Derive the primary and backup identities together.
    ///
    /// Enforces the non-collision invariant explicitly: equal public keys
    /// are an error, not a possibility left to probability.
    pub async fn derive_signing_pair(
        &self,
        coin: &str,
        seed: &Seed,
    ) -> Result<(KeyIdentity, KeyIdentity), DerivationError> {
        let primary = self.derive(coin, seed, KeyRole::Primary).await?;
        let backup = self.derive(coin, seed, KeyRole::Backup).await?;

        if primary.public_key == backup.public_key {
            return Err(DerivationError::IdentityCollision {
                coin: coin.to_string(),
            });
        }

        Ok((primary, backup))
    }
}
