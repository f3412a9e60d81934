//! Foundation types for OPAL (Object Persistence over an Append-only Ledger).
//!
//! This crate provides the core transaction, entry, and proof types used
//! throughout the OPAL system. Every other OPAL crate depends on `opal-types`.
//!
//! # Key Types
//!
//! - [`TxId`] — Monotonic transaction identifier, the store's logical clock
//! - [`LedgerEntry`] — One write as the store records it
//! - [`Proof`] — BLAKE3 hash-chain proof attached to verified entries
//! - [`WriteMode`] — Plain, verified, or expiring write dispatch
//! - [`ExpiryPolicy`] — Duration after which a stored value becomes invisible
//! - [`Reference`] / [`ScoredMember`] — Secondary-index edge types

pub mod entry;
pub mod error;
pub mod mode;
pub mod proof;
pub mod tx;

pub use entry::{LedgerEntry, Reference, ScoredMember};
pub use error::TypeError;
pub use mode::{ExpiryPolicy, WriteMode};
pub use proof::Proof;
pub use tx::TxId;
