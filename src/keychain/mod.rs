//! Keychain derivation
//!
//! Turns a validated seed into the primary and backup key identities that,
//! together with the custodian's key, form the wallet's three-party signer
//! set.
//!
//! # Example
//!
//! ```ignore
//! use custody_client::keychain::{KeychainDeriver, KeyRole};
//!
//! let keychains = KeychainDeriver::new(deriver);
//!
//! // Primary identity comes straight from the seed, backup from the
//! // perturbed seed; the two never share a public key.
//! let primary = keychains.derive("btc", &seed, KeyRole::Primary).await?;
//! let backup = keychains.derive("btc", &seed, KeyRole::Backup).await?;
//! ```

pub mod deriver;
pub mod identity;

pub use deriver::{DerivationError, DerivedKey, DeriverError, KeyDeriver, KeychainDeriver};
pub use identity::{CustodianIdentity, KeyIdentity, KeyRole, PrivateKeyMaterial};
