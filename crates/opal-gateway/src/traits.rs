//! The [`LedgerConnection`] trait defining the store primitive interface.
//!
//! A connection is an already-authenticated handle to the ledger service.
//! Connection lifecycle (login, logout, reconnect) is the collaborator's
//! concern; this layer only assumes the primitives below are reachable.

use chrono::{DateTime, Utc};
use opal_types::{LedgerEntry, Reference, ScoredMember, TxId};

use crate::error::GatewayResult;

/// Primitive operations of an append-only, transaction-ordered ledger.
///
/// All implementations must satisfy these invariants:
/// - Every committed write is assigned a strictly increasing, globally
///   ordered transaction id; prior values remain retrievable.
/// - Reads return `Ok(None)` for absent keys (never existed, tombstoned,
///   or expired), never an error.
/// - Verified operations fail with a verification error when a proof does
///   not check out; they never report success on a failed proof.
/// - Operations are blocking calls; no retries happen at this layer.
pub trait LedgerConnection: Send + Sync {
    /// Latest value for a key, unverified.
    ///
    /// A key that only exists in the reference index resolves to the
    /// referenced record's latest value.
    fn get(&self, key: &str) -> GatewayResult<Option<LedgerEntry>>;

    /// Unconditional set. Returns the assigned transaction id.
    fn set(&self, key: &str, value: &[u8]) -> GatewayResult<TxId>;

    /// Set whose proof is checked against the client's tracked state before
    /// success is reported.
    fn verified_set(&self, key: &str, value: &[u8]) -> GatewayResult<TxId>;

    /// Set that the store refuses to return at or after `expires_at`.
    fn expireable_set(
        &self,
        key: &str,
        value: &[u8],
        expires_at: DateTime<Utc>,
    ) -> GatewayResult<TxId>;

    /// Latest value for a key with its proof, revision, and resolved
    /// reference key. Fails with a verification error on proof mismatch.
    fn verified_get(&self, key: &str) -> GatewayResult<Option<LedgerEntry>>;

    /// The value current as of transaction `tx`, verified.
    fn verified_get_at(&self, key: &str, tx: TxId) -> GatewayResult<Option<LedgerEntry>>;

    /// The first entry at or after transaction `tx`, verified.
    fn verified_get_since(&self, key: &str, tx: TxId) -> GatewayResult<Option<LedgerEntry>>;

    /// All keys touched by a transaction, in the order the transaction
    /// touched them.
    fn tx_by_id(&self, tx: TxId) -> GatewayResult<Vec<String>>;

    /// Lexicographic range scan over live latest values.
    ///
    /// `seek_key` is an exclusive starting point in scan direction; pass
    /// `""` to scan from the boundary. `prefix` filters keys; `limit`
    /// bounds the number of returned entries.
    fn scan(
        &self,
        seek_key: &str,
        prefix: &str,
        reverse: bool,
        limit: usize,
    ) -> GatewayResult<Vec<(String, Vec<u8>)>>;

    /// All past values for a key, paginated and orderable.
    ///
    /// Tombstoning does not erase history: prior entries remain readable.
    fn history(
        &self,
        key: &str,
        start_offset: usize,
        limit: usize,
        reverse: bool,
    ) -> GatewayResult<Vec<LedgerEntry>>;

    /// Record a reference edge `(source, target)`, unverified.
    fn set_reference(&self, source: &str, target: &str) -> GatewayResult<TxId>;

    /// Record a reference edge after verifying the source's latest proof.
    fn verified_set_reference(&self, source: &str, target: &str) -> GatewayResult<TxId>;

    /// Add `member` to the named scored set, unverified. Re-adding an
    /// existing member updates its score.
    fn zadd(&self, set: &str, score: f64, member: &str) -> GatewayResult<TxId>;

    /// Add `member` to the named scored set after verifying the member's
    /// latest proof.
    fn verified_zadd(&self, set: &str, score: f64, member: &str) -> GatewayResult<TxId>;

    /// All reference edges pointing at `target`, in recording order.
    fn references(&self, target: &str) -> GatewayResult<Vec<Reference>>;

    /// Members of a scored set ordered by ascending score.
    fn zscan(&self, set: &str) -> GatewayResult<Vec<ScoredMember>>;

    /// Tombstone the given keys. History is retained; future unverified
    /// reads return `None`.
    fn delete(&self, keys: &[String]) -> GatewayResult<TxId>;
}
