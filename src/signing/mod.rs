//! Transaction signing

pub mod signer;

pub use signer::{Signer, SigningError, TransactionSigner};
