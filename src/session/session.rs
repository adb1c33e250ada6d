//! Wallet session facade
//!
//! Wires the seed validator, keychain deriver, verification engine, and
//! transaction signer into the two public wallet operations. This is the
//! only module that touches every collaborator. Verification always runs
//! before signing; a prebuild that fails verification never reaches the
//! signing backend.

use std::sync::Arc;

use thiserror::Error;

use crate::keychain::{
    CustodianIdentity, DerivationError, KeyDeriver, KeyIdentity, KeyRole, KeychainDeriver,
};
use crate::seed::{Seed, SeedError};
use crate::signing::{Signer, SigningError, TransactionSigner};
use crate::transaction::{SignedTransaction, TransactionExpectation, TransactionPrebuild};
use crate::verify::{
    TransactionInspector, VerificationConfig, VerificationContext, VerificationEngine,
    VerificationError,
};

/// Errors surfaced by wallet session operations.
///
/// Each variant carries the underlying error unchanged; nothing is coerced
/// to a generic failure.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
    #[error("Derivation error: {0}")]
    Derivation(#[from] DerivationError),
    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
    #[error("Derived {0} identity is missing private key material")]
    MissingKeyMaterial(KeyRole),
}

/// Stages of one `sign_transaction` call.
///
/// Progression is strictly Start -> SeedValidated -> KeysDerived -> Verified
/// -> Signed; any failure is terminal for the call. Signing is unreachable
/// without passing through Verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningStage {
    Start,
    SeedValidated,
    KeysDerived,
    Verified,
    Signed,
}

fn advance(stage: &mut SigningStage, next: SigningStage) {
    *stage = next;
    log::debug!("sign_transaction stage: {:?}", next);
}

/// Whether the session enforces prebuild verification.
///
/// The enforcing mode is the only one constructible in production builds.
/// The bypass exists for tests that exercise server-side validation and is
/// compiled out everywhere else; no runtime input can select it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VerificationMode {
    Enforced,
    #[cfg(test)]
    BypassedForTests,
}

/// Client-side session for one custodial wallet.
///
/// Holds no seed or key material between calls: every operation takes the
/// seed as input, derives what it needs, and releases it on return. Calls
/// with different seeds and prebuilds are safe to run concurrently.
pub struct WalletSession {
    keychains: KeychainDeriver,
    engine: VerificationEngine,
    signer: TransactionSigner,
    inspector: Arc<dyn TransactionInspector>,
    mode: VerificationMode,
}

impl WalletSession {
    /// Session with the default verification config (networking enabled)
    pub fn new(
        deriver: Arc<dyn KeyDeriver>,
        inspector: Arc<dyn TransactionInspector>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        Self::with_config(deriver, inspector, signer, VerificationConfig::default())
    }

    /// Session with an explicit verification config
    pub fn with_config(
        deriver: Arc<dyn KeyDeriver>,
        inspector: Arc<dyn TransactionInspector>,
        signer: Arc<dyn Signer>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            keychains: KeychainDeriver::new(deriver),
            engine: VerificationEngine::new(config),
            signer: TransactionSigner::new(signer),
            inspector,
            mode: VerificationMode::Enforced,
        }
    }

    /// Test-only session that skips prebuild verification, for exercising
    /// server-side validation paths. Unreachable outside test builds.
    #[cfg(test)]
    fn with_verification_bypassed(
        deriver: Arc<dyn KeyDeriver>,
        inspector: Arc<dyn TransactionInspector>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        let mut session = Self::new(deriver, inspector, signer);
        session.mode = VerificationMode::BypassedForTests;
        session
    }

    /// Derive a keychain identity from a 32-byte seed.
    ///
    /// Pass `is_backup` to derive the backup identity; it comes from the
    /// deterministically perturbed seed and never collides with the primary.
    /// Derivation is a pure function of `(coin, seed, is_backup)`.
    pub async fn create_keychain(
        &self,
        coin: &str,
        seed_bytes: &[u8],
        is_backup: bool,
    ) -> Result<KeyIdentity, WalletError> {
        let seed = Seed::from_bytes(seed_bytes)?;
        let role = if is_backup {
            KeyRole::Backup
        } else {
            KeyRole::Primary
        };
        let identity = self.keychains.derive(coin, &seed, role).await?;
        Ok(identity)
    }

    /// Verify and half-sign a custodian-built prebuild.
    ///
    /// Derives the primary and backup identities from the seed, checks the
    /// prebuild against the caller's expectation and the three-party signer
    /// set, and only then applies the user signature with the primary
    /// identity's key material. On verification failure the signing
    /// collaborator is never invoked.
    pub async fn sign_transaction(
        &self,
        coin: &str,
        seed_bytes: &[u8],
        custodian_public_key: &str,
        prebuild: &TransactionPrebuild,
        expectation: &TransactionExpectation,
    ) -> Result<SignedTransaction, WalletError> {
        let mut stage = SigningStage::Start;

        let seed = Seed::from_bytes(seed_bytes)?;
        advance(&mut stage, SigningStage::SeedValidated);

        let (primary, backup) = self.keychains.derive_signing_pair(coin, &seed).await?;
        advance(&mut stage, SigningStage::KeysDerived);

        let custodian = CustodianIdentity::new(custodian_public_key);
        match self.mode {
            VerificationMode::Enforced => {
                // Context is rebuilt from scratch on every attempt; nothing
                // verified here survives the call.
                let ctx = VerificationContext {
                    expectation,
                    prebuild,
                    user: &primary,
                    backup: &backup,
                    custodian: &custodian,
                };
                self.engine.verify(self.inspector.as_ref(), &ctx).await?;
            }
            #[cfg(test)]
            VerificationMode::BypassedForTests => {
                log::warn!("signing without transaction verification; test builds only");
            }
        }
        advance(&mut stage, SigningStage::Verified);

        let private_key = primary
            .private_key
            .as_ref()
            .ok_or(WalletError::MissingKeyMaterial(KeyRole::Primary))?;
        let signed = self.signer.sign(prebuild, private_key).await?;
        advance(&mut stage, SigningStage::Signed);

        Ok(signed)
    }
}
