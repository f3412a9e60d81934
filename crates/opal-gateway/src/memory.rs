//! In-memory ledger backend for tests, local demos, and embedding.
//!
//! [`InMemoryLedger`] implements the full [`LedgerConnection`] trait on top
//! of a `RwLock`-protected state: an append-only version list per key, a
//! global transaction clock, a BLAKE3 hash chain for entry proofs, and the
//! secondary reference/scored-set indexes.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use opal_types::{LedgerEntry, Proof, Reference, ScoredMember, TxId};

use crate::error::{GatewayError, GatewayResult};
use crate::traits::LedgerConnection;

/// An in-process, append-only, transaction-ordered key-value ledger.
///
/// Transaction ids start at 1 and increase by one per committed operation
/// across all keys. Every value write is chained onto the previous state
/// root, so verified reads can recompute and compare proofs. Deletes are
/// tombstones: they hide latest-value reads but leave history intact.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    last_tx: u64,
    root: Option<Proof>,
    keys: HashMap<String, KeyState>,
    tx_keys: BTreeMap<u64, Vec<String>>,
    refs: HashMap<String, Vec<Reference>>,
    zsets: HashMap<String, Vec<ScoredMember>>,
}

#[derive(Default)]
struct KeyState {
    versions: Vec<Version>,
    tombstoned: bool,
}

struct Version {
    value: Vec<u8>,
    tx: TxId,
    revision: u64,
    expires_at: Option<DateTime<Utc>>,
    proof: Proof,
    prev_root: Option<Proof>,
}

impl Version {
    fn to_entry(&self, key: &str, with_proof: bool) -> LedgerEntry {
        LedgerEntry {
            key: key.to_string(),
            value: self.value.clone(),
            tx: self.tx,
            revision: self.revision,
            expires_at: self.expires_at,
            proof: with_proof.then_some(self.proof),
            ref_key: None,
        }
    }

    fn check_proof(&self, key: &str) -> GatewayResult<()> {
        if self
            .proof
            .verify(self.prev_root.as_ref(), key, &self.value, self.tx)
        {
            Ok(())
        } else {
            Err(GatewayError::Verification {
                key: key.to_string(),
                reason: "stored entry does not match its proof".to_string(),
            })
        }
    }
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// The id of the most recently committed transaction, if any.
    pub fn last_tx(&self) -> GatewayResult<Option<TxId>> {
        let state = self.read_state()?;
        Ok((state.last_tx > 0).then(|| TxId::new(state.last_tx)))
    }

    fn read_state(&self) -> GatewayResult<RwLockReadGuard<'_, LedgerState>> {
        self.inner
            .read()
            .map_err(|_| GatewayError::Connectivity("ledger state lock poisoned".into()))
    }

    fn write_state(&self) -> GatewayResult<RwLockWriteGuard<'_, LedgerState>> {
        self.inner
            .write()
            .map_err(|_| GatewayError::Connectivity("ledger state lock poisoned".into()))
    }

    fn append(
        &self,
        key: &str,
        value: &[u8],
        expires_at: Option<DateTime<Utc>>,
    ) -> GatewayResult<TxId> {
        let mut state = self.write_state()?;
        let tx = begin_tx(&mut state, &[key]);

        let prev_root = state.root;
        let proof = Proof::compute(prev_root.as_ref(), key, value, tx);
        state.root = Some(proof);

        let entry = state.keys.entry(key.to_string()).or_default();
        let revision = entry.versions.len() as u64 + 1;
        entry.versions.push(Version {
            value: value.to_vec(),
            tx,
            revision,
            expires_at,
            proof,
            prev_root,
        });
        // A write after a tombstone revives the key for latest-value reads.
        entry.tombstoned = false;

        Ok(tx)
    }

    /// Resolve a key to its live latest version, following a reference-index
    /// alias when the key has no versions of its own.
    fn resolve_latest<'a>(
        state: &'a LedgerState,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<(&'a str, &'a Version, Option<String>)> {
        if let Some(found) = Self::latest_live(state, key, now) {
            return Some((found.0, found.1, None));
        }
        let edge = state.refs.get(key).and_then(|edges| edges.last())?;
        let (resolved_key, version) = Self::latest_live(state, &edge.source, now)?;
        Some((resolved_key, version, Some(key.to_string())))
    }

    fn latest_live<'a>(
        state: &'a LedgerState,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<(&'a str, &'a Version)> {
        let (key, entry) = state.keys.get_key_value(key)?;
        if entry.tombstoned {
            return None;
        }
        let version = entry.versions.last()?;
        if version.expires_at.is_some_and(|at| at <= now) {
            return None;
        }
        Some((key.as_str(), version))
    }

    fn verify_source(state: &LedgerState, key: &str) -> GatewayResult<()> {
        let Some((resolved, version)) = Self::latest_live(state, key, Utc::now()) else {
            return Err(GatewayError::Verification {
                key: key.to_string(),
                reason: "no live value to prove".to_string(),
            });
        };
        version.check_proof(resolved)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn begin_tx(state: &mut LedgerState, touched: &[&str]) -> TxId {
    state.last_tx += 1;
    state.tx_keys.insert(
        state.last_tx,
        touched.iter().map(|k| k.to_string()).collect(),
    );
    TxId::new(state.last_tx)
}

impl LedgerConnection for InMemoryLedger {
    fn get(&self, key: &str) -> GatewayResult<Option<LedgerEntry>> {
        let state = self.read_state()?;
        Ok(
            Self::resolve_latest(&state, key, Utc::now()).map(|(resolved, version, ref_key)| {
                let mut entry = version.to_entry(resolved, false);
                entry.ref_key = ref_key;
                entry
            }),
        )
    }

    fn set(&self, key: &str, value: &[u8]) -> GatewayResult<TxId> {
        self.append(key, value, None)
    }

    fn verified_set(&self, key: &str, value: &[u8]) -> GatewayResult<TxId> {
        let tx = self.append(key, value, None)?;
        // Check the write against the tracked state before reporting success.
        let state = self.read_state()?;
        Self::verify_source(&state, key)?;
        Ok(tx)
    }

    fn expireable_set(
        &self,
        key: &str,
        value: &[u8],
        expires_at: DateTime<Utc>,
    ) -> GatewayResult<TxId> {
        self.append(key, value, Some(expires_at))
    }

    fn verified_get(&self, key: &str) -> GatewayResult<Option<LedgerEntry>> {
        let state = self.read_state()?;
        let Some((resolved, version, ref_key)) = Self::resolve_latest(&state, key, Utc::now())
        else {
            return Ok(None);
        };
        version.check_proof(resolved)?;
        let mut entry = version.to_entry(resolved, true);
        entry.ref_key = ref_key;
        Ok(Some(entry))
    }

    fn verified_get_at(&self, key: &str, tx: TxId) -> GatewayResult<Option<LedgerEntry>> {
        let state = self.read_state()?;
        let now = Utc::now();
        let Some(entry) = state.keys.get(key) else {
            return Ok(None);
        };
        // As-of semantics: the newest version committed at or before `tx`.
        let Some(version) = entry.versions.iter().rev().find(|v| v.tx <= tx) else {
            return Ok(None);
        };
        if version.expires_at.is_some_and(|at| at <= now) {
            return Ok(None);
        }
        version.check_proof(key)?;
        Ok(Some(version.to_entry(key, true)))
    }

    fn verified_get_since(&self, key: &str, tx: TxId) -> GatewayResult<Option<LedgerEntry>> {
        let state = self.read_state()?;
        let now = Utc::now();
        let Some(entry) = state.keys.get(key) else {
            return Ok(None);
        };
        let Some(version) = entry.versions.iter().find(|v| v.tx >= tx) else {
            return Ok(None);
        };
        if version.expires_at.is_some_and(|at| at <= now) {
            return Ok(None);
        }
        version.check_proof(key)?;
        Ok(Some(version.to_entry(key, true)))
    }

    fn tx_by_id(&self, tx: TxId) -> GatewayResult<Vec<String>> {
        let state = self.read_state()?;
        Ok(state
            .tx_keys
            .get(&tx.as_u64())
            .cloned()
            .unwrap_or_default())
    }

    fn scan(
        &self,
        seek_key: &str,
        prefix: &str,
        reverse: bool,
        limit: usize,
    ) -> GatewayResult<Vec<(String, Vec<u8>)>> {
        let state = self.read_state()?;
        let now = Utc::now();

        let mut live: Vec<(&str, &Version)> = state
            .keys
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter_map(|key| Self::latest_live(&state, key, now))
            .collect();
        live.sort_by(|(a, _), (b, _)| a.cmp(b));
        if reverse {
            live.reverse();
        }

        Ok(live
            .into_iter()
            .filter(|(key, _)| {
                seek_key.is_empty()
                    || if reverse {
                        *key < seek_key
                    } else {
                        *key > seek_key
                    }
            })
            .take(limit)
            .map(|(key, version)| (key.to_string(), version.value.clone()))
            .collect())
    }

    fn history(
        &self,
        key: &str,
        start_offset: usize,
        limit: usize,
        reverse: bool,
    ) -> GatewayResult<Vec<LedgerEntry>> {
        let state = self.read_state()?;
        let Some(entry) = state.keys.get(key) else {
            return Ok(vec![]);
        };

        let mut versions: Vec<&Version> = entry.versions.iter().collect();
        if reverse {
            versions.reverse();
        }

        Ok(versions
            .into_iter()
            .skip(start_offset)
            .take(limit)
            .map(|v| v.to_entry(key, false))
            .collect())
    }

    fn set_reference(&self, source: &str, target: &str) -> GatewayResult<TxId> {
        let mut state = self.write_state()?;
        let tx = begin_tx(&mut state, &[target]);
        state
            .refs
            .entry(target.to_string())
            .or_default()
            .push(Reference::new(source, target));
        Ok(tx)
    }

    fn verified_set_reference(&self, source: &str, target: &str) -> GatewayResult<TxId> {
        let mut state = self.write_state()?;
        Self::verify_source(&state, source)?;
        let tx = begin_tx(&mut state, &[target]);
        state
            .refs
            .entry(target.to_string())
            .or_default()
            .push(Reference::new(source, target));
        Ok(tx)
    }

    fn zadd(&self, set: &str, score: f64, member: &str) -> GatewayResult<TxId> {
        let mut state = self.write_state()?;
        let tx = begin_tx(&mut state, &[set]);
        upsert_member(state.zsets.entry(set.to_string()).or_default(), member, score);
        Ok(tx)
    }

    fn verified_zadd(&self, set: &str, score: f64, member: &str) -> GatewayResult<TxId> {
        let mut state = self.write_state()?;
        Self::verify_source(&state, member)?;
        let tx = begin_tx(&mut state, &[set]);
        upsert_member(state.zsets.entry(set.to_string()).or_default(), member, score);
        Ok(tx)
    }

    fn references(&self, target: &str) -> GatewayResult<Vec<Reference>> {
        let state = self.read_state()?;
        Ok(state.refs.get(target).cloned().unwrap_or_default())
    }

    fn zscan(&self, set: &str) -> GatewayResult<Vec<ScoredMember>> {
        let state = self.read_state()?;
        let mut members = state.zsets.get(set).cloned().unwrap_or_default();
        members.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.member.cmp(&b.member))
        });
        Ok(members)
    }

    fn delete(&self, keys: &[String]) -> GatewayResult<TxId> {
        let mut state = self.write_state()?;
        let touched: Vec<&str> = keys.iter().map(String::as_str).collect();
        let tx = begin_tx(&mut state, &touched);
        for key in keys {
            if let Some(entry) = state.keys.get_mut(key) {
                entry.tombstoned = true;
            }
        }
        Ok(tx)
    }
}

fn upsert_member(members: &mut Vec<ScoredMember>, member: &str, score: f64) {
    match members.iter_mut().find(|m| m.member == member) {
        Some(existing) => existing.score = score,
        None => members.push(ScoredMember::new(member, score)),
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (key_count, last_tx) = match self.inner.read() {
            Ok(state) => (state.keys.len(), state.last_tx),
            Err(_) => (0, 0),
        };
        f.debug_struct("InMemoryLedger")
            .field("key_count", &key_count)
            .field("last_tx", &last_tx)
            .finish()
    }
}
