use thiserror::Error;

use crate::outcome::PartialCreate;

/// Errors produced by record persistence operations.
///
/// Store-facing errors propagate unchanged; the façade adds no silent
/// recovery. The one self-healing behavior in this layer is the key
/// generator's retry on a taken candidate, which surfaces only as
/// [`RecordError::KeySpaceExhausted`] once its attempt cap is reached.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record has never been saved and carries no key.
    #[error("record has no key; it must be created before this operation")]
    Unsaved,

    /// A key was already assigned to this record and keys are immutable.
    #[error("key already assigned: {0}")]
    KeyAlreadyAssigned(String),

    /// The identifier generator hit its attempt cap without finding an
    /// unused candidate.
    #[error("no unused identifier found after {attempts} attempts")]
    KeySpaceExhausted { attempts: usize },

    /// A composite create partially committed.
    #[error(transparent)]
    Partial(#[from] PartialCreate),

    /// Error from the ledger gateway.
    #[error(transparent)]
    Gateway(#[from] opal_gateway::GatewayError),

    /// Error from the field codec.
    #[error(transparent)]
    Codec(#[from] opal_codec::CodecError),
}

/// Result alias for record operations.
pub type RecordResult<T> = Result<T, RecordError>;
