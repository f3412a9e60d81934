use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::proof::Proof;
use crate::tx::TxId;

/// One write as the store records it.
///
/// `revision` counts writes to the same key (1-based). `proof` and `ref_key`
/// are populated only by verified reads; `expires_at` only for entries
/// written through the expiring path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: String,
    pub value: Vec<u8>,
    pub tx: TxId,
    pub revision: u64,
    pub expires_at: Option<DateTime<Utc>>,
    pub proof: Option<Proof>,
    /// The reference key this entry was resolved through, if the read went
    /// via the reference index rather than the primary key.
    pub ref_key: Option<String>,
}

impl LedgerEntry {
    /// Returns `true` if the entry carries an expiry deadline at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }

    /// Returns `true` if the entry carries a verification proof.
    pub fn is_verified(&self) -> bool {
        self.proof.is_some()
    }
}

/// A directed edge `(source, target)` in the store's reference index.
///
/// References carry no value, only existence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub source: String,
    pub target: String,
}

impl Reference {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Membership of a key in a named scored set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

impl ScoredMember {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}
