//! Verification engine
//!
//! Cross-checks a prebuild's inspected content against the caller's declared
//! expectation and the wallet's three-party signer set (user, backup,
//! custodian). Runs before every signature; a prebuild that fails any check
//! is refused outright.

use alloy_primitives::U256;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::keychain::{CustodianIdentity, KeyIdentity};
use crate::transaction::{Recipient, TransactionExpectation, TransactionPrebuild};
use crate::verify::inspector::{InspectionError, TransactionInspector};

/// Errors raised when a prebuild fails verification.
///
/// Every variant is an authoritative refusal: the transaction must not be
/// signed. Expected and actual values travel with the error so callers can
/// log the failing check and surface a rejection message.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Recipient mismatch: expected {expected_amount} to {expected_address}, prebuild pays {found:?}")]
    RecipientMismatch {
        expected_address: String,
        expected_amount: U256,
        found: Vec<Recipient>,
    },
    #[error("Signer set mismatch: expected {expected:?}, prebuild declares {declared:?}")]
    SignerSetMismatch {
        expected: Vec<String>,
        declared: Vec<String>,
    },
    #[error("Address metadata mismatch for {address}: expected {expected}, found {actual}")]
    MetadataMismatch {
        address: String,
        expected: Value,
        actual: Value,
    },
    #[error("Inspection failed: {0}")]
    Inspection(#[from] InspectionError),
}

/// Verification behavior switches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerificationConfig {
    /// Skip the live cross-check against the custodian's records.
    ///
    /// Production keeps networking enabled (the stricter mode); the relaxed
    /// mode exists for hermetic test environments.
    pub disable_networking: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            disable_networking: false,
        }
    }
}

/// Ephemeral inputs for one verification pass.
///
/// Built fresh per signing attempt from the caller's expectation, the three
/// signer identities, and the prebuild; never cached across calls.
pub struct VerificationContext<'a> {
    pub expectation: &'a TransactionExpectation,
    pub prebuild: &'a TransactionPrebuild,
    pub user: &'a KeyIdentity,
    pub backup: &'a KeyIdentity,
    pub custodian: &'a CustodianIdentity,
}

/// Fail-closed checker for custodian-built transactions
pub struct VerificationEngine {
    config: VerificationConfig,
}

impl VerificationEngine {
    /// Engine with the given behavior switches
    pub fn new(config: VerificationConfig) -> Self {
        Self { config }
    }

    /// Run every check against the prebuild.
    ///
    /// Success means the prebuild pays exactly what the caller authorized
    /// and binds exactly the expected signer set. Verification never
    /// mutates the prebuild.
    pub async fn verify(
        &self,
        inspector: &dyn TransactionInspector,
        ctx: &VerificationContext<'_>,
    ) -> Result<(), VerificationError> {
        let inspected = inspector.inspect(ctx.prebuild).await?;

        self.check_recipients(ctx.expectation, &inspected.recipients)?;
        self.check_signer_set(ctx, &inspected.declared_signers)?;
        self.check_metadata(ctx.expectation, &inspected.address_metadata)?;

        if !self.config.disable_networking {
            inspector.confirm_with_custodian(ctx.prebuild).await?;
        }

        log::debug!(
            "prebuild verified: {} base units to {}",
            ctx.expectation.amount,
            ctx.expectation.recipient_address
        );
        Ok(())
    }

    /// The prebuild must pay the expected recipient the exact amount, and
    /// nothing else. Extra recipients are refused along with wrong ones.
    fn check_recipients(
        &self,
        expectation: &TransactionExpectation,
        recipients: &[Recipient],
    ) -> Result<(), VerificationError> {
        let matches = |r: &Recipient| {
            r.address == expectation.recipient_address && r.amount == expectation.amount
        };
        if recipients.len() == 1 && matches(&recipients[0]) {
            return Ok(());
        }

        log::warn!(
            "rejecting prebuild: recipients {:?} do not match expectation of {} to {}",
            recipients,
            expectation.amount,
            expectation.recipient_address
        );
        Err(VerificationError::RecipientMismatch {
            expected_address: expectation.recipient_address.clone(),
            expected_amount: expectation.amount,
            found: recipients.to_vec(),
        })
    }

    /// The declared signer set must equal {user, backup, custodian} public
    /// keys order-independently. Missing, extra, duplicated, or substituted
    /// keys are refused.
    fn check_signer_set(
        &self,
        ctx: &VerificationContext<'_>,
        declared: &[String],
    ) -> Result<(), VerificationError> {
        let mut expected = vec![
            ctx.user.public_key.clone(),
            ctx.backup.public_key.clone(),
            ctx.custodian.public_key.clone(),
        ];
        let mut observed = declared.to_vec();
        expected.sort();
        observed.sort();

        if expected == observed {
            return Ok(());
        }

        log::warn!("rejecting prebuild: declared signer set does not match wallet keys");
        Err(VerificationError::SignerSetMismatch {
            expected,
            declared: declared.to_vec(),
        })
    }

    /// Metadata is checked only when the caller supplied an expectation for
    /// it; an absent prebuild entry compares as null and fails.
    fn check_metadata(
        &self,
        expectation: &TransactionExpectation,
        metadata: &Map<String, Value>,
    ) -> Result<(), VerificationError> {
        let Some(expected) = &expectation.address_metadata else {
            return Ok(());
        };

        let actual = metadata
            .get(&expectation.recipient_address)
            .cloned()
            .unwrap_or(Value::Null);
        if &actual == expected {
            return Ok(());
        }

        log::warn!(
            "rejecting prebuild: metadata for {} does not match expectation",
            expectation.recipient_address
        );
        Err(VerificationError::MetadataMismatch {
            address: expectation.recipient_address.clone(),
            expected: expected.clone(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keychain::KeyRole;
    use crate::verify::inspector::JsonPrebuildInspector;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn identity(role: KeyRole, public_key: &str) -> KeyIdentity {
        KeyIdentity {
            role,
            public_key: public_key.to_string(),
            address: format!("1{}", public_key),
            private_key: None,
        }
    }

    fn prebuild(recipients: Value, signers: Value) -> TransactionPrebuild {
        TransactionPrebuild::new(json!({
            "recipients": recipients,
            "signers": signers,
        }))
    }

    struct Fixture {
        expectation: TransactionExpectation,
        user: KeyIdentity,
        backup: KeyIdentity,
        custodian: CustodianIdentity,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                expectation: TransactionExpectation::new("1Dest", U256::from(100u64)),
                user: identity(KeyRole::Primary, "02user"),
                backup: identity(KeyRole::Backup, "03backup"),
                custodian: CustodianIdentity::new("02custodian"),
            }
        }

        fn context<'a>(&'a self, prebuild: &'a TransactionPrebuild) -> VerificationContext<'a> {
            VerificationContext {
                expectation: &self.expectation,
                prebuild,
                user: &self.user,
                backup: &self.backup,
                custodian: &self.custodian,
            }
        }
    }

    async fn verify(fixture: &Fixture, prebuild: &TransactionPrebuild) -> Result<(), VerificationError> {
        let engine = VerificationEngine::new(VerificationConfig::default());
        let inspector = JsonPrebuildInspector::new();
        engine.verify(&inspector, &fixture.context(prebuild)).await
    }

    #[tokio::test]
    async fn test_matching_prebuild_verifies() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02user", "03backup", "02custodian"]),
        );
        verify(&fixture, &prebuild).await.unwrap();
    }

    #[tokio::test]
    async fn test_signer_order_is_irrelevant() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02custodian", "02user", "03backup"]),
        );
        verify(&fixture, &prebuild).await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_amount_rejected() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "99"}]),
            json!(["02user", "03backup", "02custodian"]),
        );
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        match err {
            VerificationError::RecipientMismatch {
                expected_address,
                expected_amount,
                found,
            } => {
                assert_eq!(expected_address, "1Dest");
                assert_eq!(expected_amount, U256::from(100u64));
                assert_eq!(found[0].amount, U256::from(99u64));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_address_rejected() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Attacker", "amount": "100"}]),
            json!(["02user", "03backup", "02custodian"]),
        );
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        assert!(matches!(err, VerificationError::RecipientMismatch { .. }));
    }

    #[tokio::test]
    async fn test_extra_recipient_rejected() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([
                {"address": "1Dest", "amount": "100"},
                {"address": "1Attacker", "amount": "1"}
            ]),
            json!(["02user", "03backup", "02custodian"]),
        );
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        assert!(matches!(err, VerificationError::RecipientMismatch { .. }));
    }

    #[tokio::test]
    async fn test_missing_recipient_rejected() {
        let fixture = Fixture::new();
        let prebuild = prebuild(json!([]), json!(["02user", "03backup", "02custodian"]));
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        assert!(matches!(err, VerificationError::RecipientMismatch { .. }));
    }

    #[tokio::test]
    async fn test_substituted_custodian_rejected() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02user", "03backup", "02other"]),
        );
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        match err {
            VerificationError::SignerSetMismatch { declared, .. } => {
                assert!(declared.contains(&"02other".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicated_signer_rejected() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02user", "02user", "02custodian"]),
        );
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        assert!(matches!(err, VerificationError::SignerSetMismatch { .. }));
    }

    #[tokio::test]
    async fn test_extra_signer_rejected() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02user", "03backup", "02custodian", "02extra"]),
        );
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        assert!(matches!(err, VerificationError::SignerSetMismatch { .. }));
    }

    #[tokio::test]
    async fn test_metadata_match_accepted() {
        let mut fixture = Fixture::new();
        fixture.expectation = fixture
            .expectation
            .clone()
            .with_metadata(json!({"memo": "invoice-7"}));
        let prebuild = TransactionPrebuild::new(json!({
            "recipients": [{"address": "1Dest", "amount": "100"}],
            "signers": ["02user", "03backup", "02custodian"],
            "address_metadata": {"1Dest": {"memo": "invoice-7"}}
        }));
        verify(&fixture, &prebuild).await.unwrap();
    }

    #[tokio::test]
    async fn test_metadata_mismatch_rejected() {
        let mut fixture = Fixture::new();
        fixture.expectation = fixture
            .expectation
            .clone()
            .with_metadata(json!({"memo": "invoice-7"}));
        let prebuild = TransactionPrebuild::new(json!({
            "recipients": [{"address": "1Dest", "amount": "100"}],
            "signers": ["02user", "03backup", "02custodian"],
            "address_metadata": {"1Dest": {"memo": "invoice-8"}}
        }));
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        assert!(matches!(err, VerificationError::MetadataMismatch { .. }));
    }

    #[tokio::test]
    async fn test_absent_metadata_fails_when_expected() {
        let mut fixture = Fixture::new();
        fixture.expectation = fixture
            .expectation
            .clone()
            .with_metadata(json!({"memo": "invoice-7"}));
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02user", "03backup", "02custodian"]),
        );
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        match err {
            VerificationError::MetadataMismatch { actual, .. } => {
                assert_eq!(actual, Value::Null);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inspection_error_propagates() {
        let fixture = Fixture::new();
        let prebuild = TransactionPrebuild::new(json!({"signers": []}));
        let err = verify(&fixture, &prebuild).await.unwrap_err();
        assert!(matches!(err, VerificationError::Inspection(_)));
    }

    /// Inspector that counts custodian record checks.
    struct RecordingInspector {
        inner: JsonPrebuildInspector,
        confirms: AtomicUsize,
    }

    impl RecordingInspector {
        fn new() -> Self {
            Self {
                inner: JsonPrebuildInspector::new(),
                confirms: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TransactionInspector for RecordingInspector {
        async fn inspect(
            &self,
            prebuild: &TransactionPrebuild,
        ) -> Result<crate::transaction::InspectedTransaction, InspectionError> {
            self.inner.inspect(prebuild).await
        }

        async fn confirm_with_custodian(
            &self,
            _prebuild: &TransactionPrebuild,
        ) -> Result<(), InspectionError> {
            self.confirms.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_networking_enabled_checks_custodian_records() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02user", "03backup", "02custodian"]),
        );
        let inspector = RecordingInspector::new();
        let engine = VerificationEngine::new(VerificationConfig::default());

        engine
            .verify(&inspector, &fixture.context(&prebuild))
            .await
            .unwrap();
        assert_eq!(inspector.confirms.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custodian_record_rejection_fails_verification() {
        struct RejectingInspector {
            inner: JsonPrebuildInspector,
        }

        #[async_trait]
        impl TransactionInspector for RejectingInspector {
            async fn inspect(
                &self,
                prebuild: &TransactionPrebuild,
            ) -> Result<crate::transaction::InspectedTransaction, InspectionError> {
                self.inner.inspect(prebuild).await
            }

            async fn confirm_with_custodian(
                &self,
                _prebuild: &TransactionPrebuild,
            ) -> Result<(), InspectionError> {
                Err(InspectionError::CustodianCheck(
                    "prebuild unknown to custodian".to_string(),
                ))
            }
        }

        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02user", "03backup", "02custodian"]),
        );
        let inspector = RejectingInspector {
            inner: JsonPrebuildInspector::new(),
        };
        let engine = VerificationEngine::new(VerificationConfig::default());

        let err = engine
            .verify(&inspector, &fixture.context(&prebuild))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerificationError::Inspection(InspectionError::CustodianCheck(_))
        ));
    }

    #[tokio::test]
    async fn test_disable_networking_skips_custodian_records() {
        let fixture = Fixture::new();
        let prebuild = prebuild(
            json!([{"address": "1Dest", "amount": "100"}]),
            json!(["02user", "03backup", "02custodian"]),
        );
        let inspector = RecordingInspector::new();
        let engine = VerificationEngine::new(VerificationConfig {
            disable_networking: true,
        });

        engine
            .verify(&inspector, &fixture.context(&prebuild))
            .await
            .unwrap();
        assert_eq!(inspector.confirms.load(Ordering::SeqCst), 0);
    }
}
