//! Wallet seed type
//!
//! Keychains are derived from a single 32-byte secret seed. Some derivation
//! back-ends (the Stellar and Algorand families) require exactly 32 bytes
//! while others tolerate a range; this crate normalizes on the strictest
//! requirement so every coin shares one code path.

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Required seed length in bytes
pub const SEED_LENGTH: usize = 32;

/// Errors raised by seed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("Seed must be exactly 32 bytes, got {actual}")]
    InvalidLength { actual: usize },
}

/// A validated 32-byte wallet seed.
///
/// The buffer is zeroized when the value is dropped. Seeds are supplied by
/// the caller per call and never persisted by this crate.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LENGTH]);

impl Seed {
    /// Validate raw bytes into a seed.
    ///
    /// Anything other than exactly 32 bytes (including an empty slice) is
    /// rejected, never padded or truncated.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SeedError> {
        let buf: [u8; SEED_LENGTH] = bytes.try_into().map_err(|_| SeedError::InvalidLength {
            actual: bytes.len(),
        })?;
        Ok(Self(buf))
    }

    /// Raw seed bytes
    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }

    /// The deterministic backup-seed variant: byte 0 incremented mod 256.
    ///
    /// Custodian policy refuses wallets whose user and backup keys are
    /// identical, so the backup identity must come from a seed that differs
    /// from the primary seed. The perturbation is reproducible because
    /// recovery flows re-derive the backup key from the seed alone.
    /// Wraparound (255 -> 0) still differs from the original at byte 0.
    pub fn perturbed(&self) -> Self {
        let mut buf = self.0;
        buf[0] = buf[0].wrapping_add(1);
        Self(buf)
    }
}

// Implement Debug manually to keep seed bytes out of logs
impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Seed").field(&"[REDACTED]").finish()
    }
}
