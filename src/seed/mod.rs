//! Seed validation and handling

pub mod seed;

pub use seed::{Seed, SeedError, SEED_LENGTH};
