//! Prebuild inspection boundary
//!
//! A [`TransactionInspector`] parses an opaque prebuild into the recipients,
//! signer set, and metadata it actually declares. SDK-backed deployments
//! implement this against their coin libraries; the bundled
//! [`JsonPrebuildInspector`] handles the JSON documents produced by the
//! custodian sandbox environment.

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::transaction::{InspectedTransaction, Recipient, TransactionPrebuild};

/// Errors raised while inspecting a prebuild
#[derive(Error, Debug)]
pub enum InspectionError {
    #[error("Prebuild is missing required field: {0}")]
    MissingField(&'static str),
    #[error("Prebuild field {field} is malformed: {reason}")]
    MalformedField { field: &'static str, reason: String },
    #[error("Custodian record check failed: {0}")]
    CustodianCheck(String),
    #[error("{0}")]
    Backend(String),
}

/// Parses a prebuild into its observable effects
#[async_trait]
pub trait TransactionInspector: Send + Sync {
    /// Extract the recipients, declared signers, and metadata of a prebuild
    async fn inspect(
        &self,
        prebuild: &TransactionPrebuild,
    ) -> Result<InspectedTransaction, InspectionError>;

    /// Cross-check the prebuild against the custodian's own records.
    ///
    /// Called only when networking is enabled in the verification config.
    /// Inspectors without a remote backend accept by default.
    async fn confirm_with_custodian(
        &self,
        _prebuild: &TransactionPrebuild,
    ) -> Result<(), InspectionError> {
        Ok(())
    }
}

/// Inspector for JSON prebuild documents.
///
/// Expected document shape:
///
/// ```json
/// {
///   "recipients": [{ "address": "1Dest", "amount": "100" }],
///   "signers": ["02aa..", "03bb..", "02cc.."],
///   "address_metadata": { "1Dest": { "memo": "..." } }
/// }
/// ```
///
/// Amounts are decimal strings or unsigned integers; floating point is
/// rejected outright.
#[derive(Debug, Default, Clone)]
pub struct JsonPrebuildInspector;

impl JsonPrebuildInspector {
    /// Create an inspector
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransactionInspector for JsonPrebuildInspector {
    async fn inspect(
        &self,
        prebuild: &TransactionPrebuild,
    ) -> Result<InspectedTransaction, InspectionError> {
        let doc = prebuild.document();

        let recipients = doc
            .get("recipients")
            .ok_or(InspectionError::MissingField("recipients"))?
            .as_array()
            .ok_or_else(|| InspectionError::MalformedField {
                field: "recipients",
                reason: "expected an array".to_string(),
            })?
            .iter()
            .map(parse_recipient)
            .collect::<Result<Vec<_>, _>>()?;

        let declared_signers = doc
            .get("signers")
            .ok_or(InspectionError::MissingField("signers"))?
            .as_array()
            .ok_or_else(|| InspectionError::MalformedField {
                field: "signers",
                reason: "expected an array".to_string(),
            })?
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| InspectionError::MalformedField {
                        field: "signers",
                        reason: "expected hex string entries".to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let address_metadata = match doc.get("address_metadata") {
            None => Map::new(),
            Some(value) => value
                .as_object()
                .cloned()
                .ok_or_else(|| InspectionError::MalformedField {
                    field: "address_metadata",
                    reason: "expected an object".to_string(),
                })?,
        };

        Ok(InspectedTransaction {
            recipients,
            declared_signers,
            address_metadata,
        })
    }
}

fn parse_recipient(value: &Value) -> Result<Recipient, InspectionError> {
    let address = value
        .get("address")
        .and_then(Value::as_str)
        .ok_or(InspectionError::MissingField("recipients.address"))?
        .to_string();

    let amount = value
        .get("amount")
        .ok_or(InspectionError::MissingField("recipients.amount"))?;

    Ok(Recipient {
        address,
        amount: parse_amount(amount)?,
    })
}

fn parse_amount(value: &Value) -> Result<U256, InspectionError> {
    match value {
        Value::String(text) => {
            text.parse::<U256>()
                .map_err(|e| InspectionError::MalformedField {
                    field: "recipients.amount",
                    reason: e.to_string(),
                })
        }
        Value::Number(number) => number.as_u64().map(U256::from).ok_or_else(|| {
            InspectionError::MalformedField {
                field: "recipients.amount",
                reason: "expected a non-negative integer".to_string(),
            }
        }),
        _ => Err(InspectionError::MalformedField {
            field: "recipients.amount",
            reason: "expected a string or integer".to_string(),
        }),
    }
}
