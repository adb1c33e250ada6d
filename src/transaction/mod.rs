//! Transaction intent and artifact types

pub mod transaction;

pub use transaction::{
    InspectedTransaction, Recipient, SignedTransaction, TransactionExpectation,
    TransactionPrebuild,
};
