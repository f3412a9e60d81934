//! The record persistence façade.

use std::sync::Arc;

use chrono::Utc;
use opal_codec::{FieldMap, RecordCodec};
use opal_gateway::Gateway;
use opal_types::{LedgerEntry, Proof, Reference, ScoredMember, TxId, WriteMode};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{RecordError, RecordResult};
use crate::keygen::KeyGenerator;
use crate::outcome::{CreateOutcome, CreateRequest, CreateStep, PartialCreate};
use crate::record::Record;

/// Default entry cap for scans and history reads.
pub const DEFAULT_LIMIT: usize = 1000;

/// A record as read back from the ledger.
#[derive(Clone, Debug)]
pub struct RecordView {
    pub key: String,
    pub fields: FieldMap,
    pub tx: TxId,
    pub revision: u64,
    /// Whether the read carried a validated proof.
    pub verified: bool,
    /// The reference key the read resolved through, if any.
    pub ref_key: Option<String>,
    pub proof: Option<Proof>,
}

impl RecordView {
    fn from_entry(entry: LedgerEntry, codec: &RecordCodec) -> RecordResult<Self> {
        let fields = codec.decode(&entry.value)?;
        Ok(Self {
            key: entry.key,
            fields,
            tx: entry.tx,
            revision: entry.revision,
            verified: entry.proof.is_some(),
            ref_key: entry.ref_key,
            proof: entry.proof,
        })
    }
}

/// One historical value of a record.
#[derive(Clone, Debug)]
pub struct RecordVersion {
    pub fields: FieldMap,
    pub tx: TxId,
    pub revision: u64,
}

/// Public API over the gateway and codec: create, save, retrieve, scan,
/// history, delete, and reference attachment for typed records.
///
/// A logical record moves `Unsaved → Saved → (re-Saved)* → Deleted`;
/// tombstoning is not terminal for history reads. The store performs every
/// sub-operation sequentially and adds no retries, batching, locking, or
/// compare-and-swap: concurrent writers race at the ledger's ordering
/// layer and must not assume their write is the one reflected at latest.
pub struct RecordStore {
    gateway: Arc<Gateway>,
    codec: RecordCodec,
    keygen: KeyGenerator,
    config: StoreConfig,
}

impl RecordStore {
    /// A store with default configuration over an existing gateway.
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self::with_config(gateway, StoreConfig::default())
    }

    /// A store with explicit configuration.
    pub fn with_config(gateway: Arc<Gateway>, config: StoreConfig) -> Self {
        Self {
            gateway,
            codec: RecordCodec::default(),
            keygen: KeyGenerator::new(config.max_key_attempts),
            config,
        }
    }

    /// Replace the codec, e.g. to change the reserved bookkeeping set.
    pub fn with_codec(mut self, codec: RecordCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Create a record: assign a key, write the encoded fields, then attach
    /// every reference and scored reference in request order.
    ///
    /// Not transactional. A failure on the third of five references leaves
    /// the first two committed; the returned [`PartialCreate`] lists the
    /// committed steps so the caller can retry just the remainder.
    pub fn create(&self, request: CreateRequest) -> RecordResult<CreateOutcome> {
        let key = match &request.key {
            Some(key) => key.clone(),
            None => self.keygen.generate(&self.gateway)?,
        };

        let payload = self.codec.encode(&request.fields)?;
        let expiry = request.expiry.or(self.config.default_expiry);
        let mode = WriteMode::select(request.verified, expiry.map(|p| p.deadline(Utc::now())));

        let mut committed: Vec<CreateStep> = Vec::new();
        let tx = self.gateway.write(&key, &payload, mode).map_err(|source| {
            partial(&key, &committed, CreateStep::Write, source)
        })?;
        committed.push(CreateStep::Write);

        for target in &request.references {
            let step = CreateStep::Reference {
                target: target.clone(),
            };
            self.gateway
                .add_reference(&key, target, request.verified)
                .map_err(|source| {
                    warn!(key = %key, target = %target, "reference attachment failed");
                    partial(&key, &committed, step.clone(), source)
                })?;
            committed.push(step);
        }

        for (set, score) in &request.scored_references {
            let step = CreateStep::ScoredReference {
                set: set.clone(),
                score: *score,
            };
            self.gateway
                .add_scored_reference(set, &key, *score, request.verified)
                .map_err(|source| {
                    warn!(key = %key, set = %set, "scored reference attachment failed");
                    partial(&key, &committed, step.clone(), source)
                })?;
            committed.push(step);
        }

        debug!(key = %key, %tx, steps = committed.len(), "record created");
        Ok(CreateOutcome { key, tx, committed })
    }

    /// Re-encode and re-write a record under its existing key, producing a
    /// new transaction id. References are not touched.
    pub fn save(&self, record: &Record) -> RecordResult<TxId> {
        let key = record.key().ok_or(RecordError::Unsaved)?;
        let payload = self.codec.encode(record.fields())?;
        let mode = record.write_mode(Utc::now(), self.config.default_expiry);
        Ok(self.gateway.write(key, &payload, mode)?)
    }

    /// Latest value for a key, decoded. With `only_verified` the read goes
    /// through the proof-checked path.
    pub fn get(&self, key: &str, only_verified: bool) -> RecordResult<Option<RecordView>> {
        self.view(self.gateway.read(key, only_verified)?)
    }

    /// The record's value as of exactly transaction `tx`, verified.
    pub fn get_with_transaction(&self, key: &str, tx: TxId) -> RecordResult<Option<RecordView>> {
        self.view(self.gateway.read_at(key, tx)?)
    }

    /// The first value at or after `tx + step`, verified.
    ///
    /// With `step = 1` the entry at `tx` itself is excluded.
    pub fn after(&self, key: &str, tx: TxId, step: u64) -> RecordResult<Option<RecordView>> {
        self.view(self.gateway.read_since(key, tx.offset(step))?)
    }

    /// All keys touched by transaction `tx`.
    pub fn get_keys(&self, tx: TxId) -> RecordResult<Vec<String>> {
        Ok(self.gateway.keys_at_transaction(tx)?)
    }

    /// Full scan with an empty prefix.
    pub fn all(&self, limit: usize, reverse: bool) -> RecordResult<Vec<(String, FieldMap)>> {
        self.starts_with("", "", limit, reverse)
    }

    /// Prefix-scoped scan starting just past `key_hint`.
    pub fn starts_with(
        &self,
        key_hint: &str,
        prefix: &str,
        limit: usize,
        reverse: bool,
    ) -> RecordResult<Vec<(String, FieldMap)>> {
        self.gateway
            .scan(key_hint, prefix, reverse, limit)?
            .into_iter()
            .map(|(key, value)| Ok((key, self.codec.decode(&value)?)))
            .collect()
    }

    /// Full mutation history of a key, decoded and paginated.
    pub fn history(
        &self,
        key: &str,
        limit: usize,
        start_offset: usize,
        reverse: bool,
    ) -> RecordResult<Vec<RecordVersion>> {
        self.gateway
            .history(key, start_offset, limit, reverse)?
            .into_iter()
            .map(|entry| {
                Ok(RecordVersion {
                    fields: self.codec.decode(&entry.value)?,
                    tx: entry.tx,
                    revision: entry.revision,
                })
            })
            .collect()
    }

    /// Tombstone a record. History reads remain valid afterwards.
    pub fn delete(&self, key: &str) -> RecordResult<TxId> {
        Ok(self.gateway.delete(&[key.to_string()])?)
    }

    /// Attach a reference to an existing record after the fact.
    pub fn set_reference(
        &self,
        key: &str,
        ref_key: &str,
        only_verified: bool,
    ) -> RecordResult<TxId> {
        Ok(self.gateway.add_reference(key, ref_key, only_verified)?)
    }

    /// Reference edges pointing at `target`.
    pub fn references(&self, target: &str) -> RecordResult<Vec<Reference>> {
        Ok(self.gateway.references(target)?)
    }

    /// Members of a scored set ordered by ascending score.
    pub fn scored_members(&self, set: &str) -> RecordResult<Vec<ScoredMember>> {
        Ok(self.gateway.scored_members(set)?)
    }

    fn view(&self, entry: Option<LedgerEntry>) -> RecordResult<Option<RecordView>> {
        entry
            .map(|entry| RecordView::from_entry(entry, &self.codec))
            .transpose()
    }
}

fn partial(
    key: &str,
    committed: &[CreateStep],
    failed: CreateStep,
    source: opal_gateway::GatewayError,
) -> RecordError {
    RecordError::Partial(PartialCreate {
        key: key.to_string(),
        committed: committed.to_vec(),
        failed,
        source,
    })
}
