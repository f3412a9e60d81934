//! The single choke point for ledger operations.

use std::sync::Arc;

use opal_types::{LedgerEntry, Reference, ScoredMember, TxId, WriteMode};
use tracing::debug;

use crate::error::GatewayResult;
use crate::traits::LedgerConnection;

/// Issues write, read, reference, scored-reference, delete, and history
/// operations against the store.
///
/// The gateway exclusively owns the live connection handle. It is
/// constructed once at process start with an already-authenticated
/// connection and passed by reference to higher layers; there is no ambient
/// global. All operations are blocking and sequential; retry policy belongs
/// to the caller.
pub struct Gateway {
    conn: Arc<dyn LedgerConnection>,
}

impl Gateway {
    /// Wrap an authenticated ledger connection.
    pub fn new(conn: Arc<dyn LedgerConnection>) -> Self {
        Self { conn }
    }

    /// Write a value under `key` through exactly one mode.
    pub fn write(&self, key: &str, value: &[u8], mode: WriteMode) -> GatewayResult<TxId> {
        debug!(key, ?mode, len = value.len(), "ledger write");
        match mode {
            WriteMode::Plain => self.conn.set(key, value),
            WriteMode::Verified => self.conn.verified_set(key, value),
            WriteMode::Expiring { at } => self.conn.expireable_set(key, value, at),
        }
    }

    /// Latest value for `key`. The verified path additionally returns the
    /// proof, revision, and resolved reference key, and fails on a proof
    /// mismatch.
    pub fn read(&self, key: &str, verified: bool) -> GatewayResult<Option<LedgerEntry>> {
        debug!(key, verified, "ledger read");
        if verified {
            self.conn.verified_get(key)
        } else {
            self.conn.get(key)
        }
    }

    /// The value current as of transaction `tx`, verified.
    pub fn read_at(&self, key: &str, tx: TxId) -> GatewayResult<Option<LedgerEntry>> {
        debug!(key, %tx, "ledger read at tx");
        self.conn.verified_get_at(key, tx)
    }

    /// The first entry for `key` at or after transaction `tx`, verified.
    pub fn read_since(&self, key: &str, tx: TxId) -> GatewayResult<Option<LedgerEntry>> {
        debug!(key, %tx, "ledger read since tx");
        self.conn.verified_get_since(key, tx)
    }

    /// All keys touched by transaction `tx`.
    pub fn keys_at_transaction(&self, tx: TxId) -> GatewayResult<Vec<String>> {
        self.conn.tx_by_id(tx)
    }

    /// Lexicographic range/prefix scan bounded by `limit` entries.
    pub fn scan(
        &self,
        start_key: &str,
        prefix: &str,
        reverse: bool,
        limit: usize,
    ) -> GatewayResult<Vec<(String, Vec<u8>)>> {
        debug!(start_key, prefix, reverse, limit, "ledger scan");
        self.conn.scan(start_key, prefix, reverse, limit)
    }

    /// All past values for `key`, paginated and orderable.
    pub fn history(
        &self,
        key: &str,
        start_offset: usize,
        limit: usize,
        reverse: bool,
    ) -> GatewayResult<Vec<LedgerEntry>> {
        debug!(key, start_offset, limit, reverse, "ledger history");
        self.conn.history(key, start_offset, limit, reverse)
    }

    /// Attach a reference edge `(source, target)`.
    pub fn add_reference(&self, source: &str, target: &str, verified: bool) -> GatewayResult<TxId> {
        debug!(source, target, verified, "ledger reference");
        if verified {
            self.conn.verified_set_reference(source, target)
        } else {
            self.conn.set_reference(source, target)
        }
    }

    /// Attach a scored-set membership for `member` in `set`.
    pub fn add_scored_reference(
        &self,
        set: &str,
        member: &str,
        score: f64,
        verified: bool,
    ) -> GatewayResult<TxId> {
        debug!(set, member, score, verified, "ledger scored reference");
        if verified {
            self.conn.verified_zadd(set, score, member)
        } else {
            self.conn.zadd(set, score, member)
        }
    }

    /// Reference edges pointing at `target`.
    pub fn references(&self, target: &str) -> GatewayResult<Vec<Reference>> {
        self.conn.references(target)
    }

    /// Members of a scored set ordered by ascending score.
    pub fn scored_members(&self, set: &str) -> GatewayResult<Vec<ScoredMember>> {
        self.conn.zscan(set)
    }

    /// Tombstone the given keys.
    pub fn delete(&self, keys: &[String]) -> GatewayResult<TxId> {
        debug!(count = keys.len(), "ledger delete");
        self.conn.delete(keys)
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use chrono::{Duration, Utc};

    fn gateway() -> Gateway {
        Gateway::new(Arc::new(InMemoryLedger::new()))
    }

    #[test]
    fn plain_write_is_readable_unverified() {
        let gw = gateway();
        let tx = gw.write("k", b"v", WriteMode::Plain).unwrap();
        let entry = gw.read("k", false).unwrap().unwrap();
        assert_eq!(entry.value, b"v");
        assert_eq!(entry.tx, tx);
        assert!(entry.proof.is_none());
    }

    #[test]
    fn verified_write_and_read_carry_a_proof() {
        let gw = gateway();
        gw.write("k", b"v", WriteMode::Verified).unwrap();
        let entry = gw.read("k", true).unwrap().unwrap();
        assert!(entry.proof.is_some());
    }

    #[test]
    fn expiring_write_becomes_absent_after_the_deadline() {
        let gw = gateway();
        let past = Utc::now() - Duration::seconds(1);
        gw.write("k", b"v", WriteMode::Expiring { at: past }).unwrap();
        assert!(gw.read("k", false).unwrap().is_none());
    }

    #[test]
    fn read_at_and_read_since_walk_the_clock() {
        let gw = gateway();
        let t1 = gw.write("k", b"one", WriteMode::Plain).unwrap();
        let t2 = gw.write("k", b"two", WriteMode::Plain).unwrap();

        assert_eq!(gw.read_at("k", t1).unwrap().unwrap().value, b"one");
        assert_eq!(gw.read_since("k", t1.next()).unwrap().unwrap().tx, t2);
    }

    #[test]
    fn reference_variants_dispatch_on_the_flag() {
        let gw = gateway();
        gw.write("rec", b"v", WriteMode::Plain).unwrap();
        gw.add_reference("rec", "R1", false).unwrap();
        gw.add_reference("rec", "R2", true).unwrap();

        assert_eq!(gw.references("R1").unwrap().len(), 1);
        assert_eq!(gw.references("R2").unwrap().len(), 1);
    }

    #[test]
    fn scored_references_land_in_the_set() {
        let gw = gateway();
        gw.write("rec", b"v", WriteMode::Plain).unwrap();
        gw.add_scored_reference("board", "rec", 1.5, true).unwrap();

        let members = gw.scored_members("board").unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].member, "rec");
        assert_eq!(members[0].score, 1.5);
    }

    #[test]
    fn delete_tombstones_but_history_survives() {
        let gw = gateway();
        gw.write("k", b"v", WriteMode::Plain).unwrap();
        gw.delete(&["k".to_string()]).unwrap();

        assert!(gw.read("k", false).unwrap().is_none());
        assert_eq!(gw.history("k", 0, 100, true).unwrap().len(), 1);
    }

    #[test]
    fn keys_at_transaction_round_trips() {
        let gw = gateway();
        let tx = gw.write("k", b"v", WriteMode::Plain).unwrap();
        assert_eq!(gw.keys_at_transaction(tx).unwrap(), vec!["k"]);
    }
}
