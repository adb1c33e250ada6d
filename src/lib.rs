//! Custody Client: client-side signing core for custodial multi-signature wallets
//!
//! This crate implements the checks a wallet client runs before delegating
//! transaction co-signing to a remote custodian service:
//! - Seed-to-keychain derivation with primary/backup collision avoidance
//! - Three-party verification of custodian-built transaction prebuilds
//!   (recipients, amounts, declared signer set, address metadata)
//! - Half-signing with the locally derived user key
//! - Deterministic secp256k1 reference backends for derivation, inspection,
//!   and signing
//!
//! Verification always runs before signing: a prebuild whose observable
//! effects differ from the caller's expectation is refused and the signing
//! backend is never invoked.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use alloy_primitives::U256;
//! use custody_client::crypto::{EcdsaKeyDeriver, EcdsaSigner};
//! use custody_client::session::WalletSession;
//! use custody_client::transaction::TransactionExpectation;
//! use custody_client::verify::JsonPrebuildInspector;
//!
//! let session = WalletSession::new(
//!     Arc::new(EcdsaKeyDeriver::new()),
//!     Arc::new(JsonPrebuildInspector::new()),
//!     Arc::new(EcdsaSigner::new()),
//! );
//!
//! // Two keychains per wallet: user and backup
//! let user = session.create_keychain("btc", &seed, false).await?;
//! let backup = session.create_keychain("btc", &seed, true).await?;
//!
//! // Later: verify and half-sign a custodian-built prebuild
//! let expectation = TransactionExpectation::new(address, U256::from(100u64));
//! let signed = session
//!     .sign_transaction("btc", &seed, &custodian_pub, &prebuild, &expectation)
//!     .await?;
//! ```

pub mod crypto;
pub mod keychain;
pub mod seed;
pub mod session;
pub mod signing;
pub mod transaction;
pub mod verify;

// Re-export commonly used types
pub use crypto::{EcdsaKeyDeriver, EcdsaSigner, KeyPair};
pub use keychain::{
    CustodianIdentity, KeyDeriver, KeyIdentity, KeyRole, KeychainDeriver, PrivateKeyMaterial,
};
pub use seed::{Seed, SeedError, SEED_LENGTH};
pub use session::{WalletError, WalletSession};
pub use signing::{Signer, SigningError, TransactionSigner};
pub use transaction::{
    SignedTransaction, TransactionExpectation, TransactionPrebuild,
};
pub use verify::{
    JsonPrebuildInspector, TransactionInspector, VerificationConfig, VerificationEngine,
    VerificationError,
};
