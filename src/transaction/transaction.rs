//! Transaction intent and artifact types
//!
//! The caller states what a transaction is allowed to do
//! ([`TransactionExpectation`]); the custodian supplies what it actually does
//! ([`TransactionPrebuild`], parsed into [`InspectedTransaction`]). Signing
//! produces the half-signed artifact ([`SignedTransaction`]).

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The caller's declared transaction intent.
///
/// Verification refuses any prebuild whose observable effects differ from
/// these values. Amounts are in the asset's smallest unit (satoshi, wei,
/// stroop) and are compared with exact integer equality, never floating
/// point and never with a tolerance.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransactionExpectation {
    /// Destination address the caller authorized
    pub recipient_address: String,
    /// Amount in base units
    pub amount: U256,
    /// Metadata the destination address must carry, if any
    pub address_metadata: Option<Value>,
}

impl TransactionExpectation {
    /// Expectation for a plain send with no address metadata
    pub fn new(recipient_address: impl Into<String>, amount: U256) -> Self {
        Self {
            recipient_address: recipient_address.into(),
            amount,
            address_metadata: None,
        }
    }

    /// Attach address metadata the prebuild must match
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.address_metadata = Some(metadata);
        self
    }
}

/// An unsigned transaction constructed by the custodian service.
///
/// Opaque to this crate: it is handed to the inspector and the signer and
/// never mutated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransactionPrebuild(Value);

impl TransactionPrebuild {
    /// Wrap a prebuild document
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// The underlying document
    pub fn document(&self) -> &Value {
        &self.0
    }

    /// Canonical byte encoding, used for digesting and signing
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }
}

/// A single recipient observed in an inspected prebuild
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    /// Destination address
    pub address: String,
    /// Amount in base units
    pub amount: U256,
}

/// What the inspector extracted from a prebuild
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InspectedTransaction {
    /// Recipients and amounts the transaction actually pays
    pub recipients: Vec<Recipient>,
    /// Public keys the prebuild declares as authorized signers (hex)
    pub declared_signers: Vec<String>,
    /// Per-address metadata declared by the prebuild
    pub address_metadata: Map<String, Value>,
}

/// A transaction bearing the first of the required signatures.
///
/// Half-signed: the custodian applies its own signature out-of-band after
/// this artifact is submitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The prebuild the signature covers
    pub prebuild: TransactionPrebuild,
    /// Signature over the prebuild (hex)
    pub signature: String,
    /// Public key the signature is attributable to (hex)
    pub signer_public_key: String,
    /// When the signature was produced
    pub signed_at: DateTime<Utc>,
}
