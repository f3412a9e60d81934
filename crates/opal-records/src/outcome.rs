//! Step-reporting results for composite create operations.
//!
//! `create` is not transactional: the write and each reference attachment
//! commit independently. A failure partway through leaves the earlier steps
//! committed, so the result names every step that succeeded and the one
//! that failed; callers can retry just the remainder.

use std::fmt;

use opal_codec::FieldMap;
use opal_gateway::GatewayError;
use opal_types::{ExpiryPolicy, TxId};

/// Input to [`RecordStore::create`](crate::store::RecordStore::create).
#[derive(Clone, Debug, Default)]
pub struct CreateRequest {
    /// User-defined fields for the new record.
    pub fields: FieldMap,
    /// Key to use; `None` asks the identifier generator for one.
    pub key: Option<String>,
    /// Whether writes and edge attachments use the verified variants.
    pub verified: bool,
    /// Targets of reference edges to attach, in order.
    pub references: Vec<String>,
    /// `(set name, score)` scored-set memberships to attach, in order.
    pub scored_references: Vec<(String, f64)>,
    /// Expiry for this record; `None` falls back to the store default.
    pub expiry: Option<ExpiryPolicy>,
}

impl CreateRequest {
    pub fn new(fields: FieldMap) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn reference(mut self, target: impl Into<String>) -> Self {
        self.references.push(target.into());
        self
    }

    pub fn scored_reference(mut self, set: impl Into<String>, score: f64) -> Self {
        self.scored_references.push((set.into(), score));
        self
    }

    pub fn expiring(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry = Some(policy);
        self
    }
}

/// One independently committed step of a create.
#[derive(Clone, Debug, PartialEq)]
pub enum CreateStep {
    /// The codec-encoded value write.
    Write,
    /// A reference edge to `target`.
    Reference { target: String },
    /// A scored-set membership in `set`.
    ScoredReference { set: String, score: f64 },
}

impl fmt::Display for CreateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateStep::Write => f.write_str("write"),
            CreateStep::Reference { target } => write!(f, "reference -> {target}"),
            CreateStep::ScoredReference { set, score } => {
                write!(f, "scored reference in {set} (score {score})")
            }
        }
    }
}

/// A fully committed create.
#[derive(Clone, Debug)]
pub struct CreateOutcome {
    /// The saved record's key.
    pub key: String,
    /// Transaction id of the value write.
    pub tx: TxId,
    /// Every committed step, in execution order.
    pub committed: Vec<CreateStep>,
}

/// A create that committed some steps and then failed.
///
/// The underlying store provides no atomicity across the write and its edge
/// attachments; this error makes the partial commit explicit instead of
/// implying all-or-nothing semantics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("create for key {key} failed at step `{failed}` with {} step(s) committed: {source}", committed.len())]
pub struct PartialCreate {
    /// Key of the record being created.
    pub key: String,
    /// Steps that committed before the failure, in execution order.
    pub committed: Vec<CreateStep>,
    /// The step that failed.
    pub failed: CreateStep,
    /// Why it failed.
    #[source]
    pub source: GatewayError,
}
