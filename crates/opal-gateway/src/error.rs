use thiserror::Error;

/// Errors produced by gateway and ledger-connection operations.
///
/// Absence of a key is not an error: reads return `Ok(None)` for keys that
/// never existed, were tombstoned, or have expired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Transport or service unreachable. Transient: the caller may retry.
    /// The gateway itself performs no retries.
    #[error("ledger service unreachable: {0}")]
    Connectivity(String),

    /// A cryptographic proof failed to validate on a verified read or
    /// write. Non-transient for that operation; never downgraded to
    /// success.
    #[error("verification failed for key {key}: {reason}")]
    Verification { key: String, reason: String },

    /// Payload could not be serialized or deserialized at the wire boundary.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
