//! Wallet session facade

pub mod session;

pub use session::{SigningStage, WalletError, WalletSession};
