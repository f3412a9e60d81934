//! Ledger operation gateway for OPAL.
//!
//! This crate is the single choke point between the persistence layer and
//! the append-only, cryptographically verifiable key-value store. It owns
//! the live connection handle and exposes the uniform operation set: plain,
//! verified, and expiring writes; latest, at-transaction, and
//! since-transaction reads; lexicographic scans; per-key history; reference
//! and scored-reference edges; and tombstone deletes.
//!
//! # Architecture
//!
//! - [`LedgerConnection`] — the primitive interface an authenticated store
//!   handle provides. Connection lifecycle (login, logout, reconnect) is an
//!   external collaborator's concern.
//! - [`Gateway`] — the operation choke point. Constructed explicitly with
//!   an injected connection and passed by reference; no ambient singleton.
//! - [`InMemoryLedger`] — an in-process backend with BLAKE3 hash-chain
//!   proofs, for tests and embedding.
//!
//! # Failure semantics
//!
//! Every operation can fail with [`GatewayError::Connectivity`] (transient,
//! caller may retry) or, on verified paths, [`GatewayError::Verification`]
//! (fatal to that operation). Absent keys are `Ok(None)`, never an error.
//! The gateway performs no retries itself.

pub mod error;
pub mod gateway;
pub mod memory;
pub mod traits;

pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use memory::InMemoryLedger;
pub use traits::LedgerConnection;
