//! Prebuild verification
//!
//! The client's only independent check that a remotely-constructed
//! transaction does what the caller intended. Every check fails closed:
//! ambiguity is a refusal, never best-effort acceptance.

pub mod engine;
pub mod inspector;

pub use engine::{
    VerificationConfig, VerificationContext, VerificationEngine, VerificationError,
};
pub use inspector::{InspectionError, JsonPrebuildInspector, TransactionInspector};
