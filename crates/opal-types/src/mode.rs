use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a single write reaches the ledger.
///
/// Exactly one mode applies per write. Callers choose based on the record's
/// verified flag and expiry policy via [`WriteMode::select`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// Unconditional set.
    Plain,
    /// Set whose proof is checked against the client's tracked state before
    /// the write is reported as successful.
    Verified,
    /// Set that the store refuses to return at or after the deadline.
    Expiring { at: DateTime<Utc> },
}

impl WriteMode {
    /// Select the write mode for a record.
    ///
    /// When a record is both verified and expiring, the expiring path wins
    /// and the write carries no proof check. This precedence is inherited
    /// from the upstream store contract and is flagged as an open product
    /// question rather than merged into a combined mode.
    pub fn select(verified: bool, expires_at: Option<DateTime<Utc>>) -> Self {
        match expires_at {
            Some(at) => WriteMode::Expiring { at },
            None if verified => WriteMode::Verified,
            None => WriteMode::Plain,
        }
    }

    /// Returns `true` for the verified path.
    pub fn is_verified(&self) -> bool {
        matches!(self, WriteMode::Verified)
    }
}

/// A duration after which a stored value becomes inaccessible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryPolicy {
    pub after: Duration,
}

impl ExpiryPolicy {
    pub fn new(after: Duration) -> Self {
        Self { after }
    }

    /// The absolute deadline for a write issued at `now`.
    pub fn deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + chrono::Duration::from_std(self.after).unwrap_or(chrono::Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_plain_when_nothing_configured() {
        assert_eq!(WriteMode::select(false, None), WriteMode::Plain);
    }

    #[test]
    fn select_verified_without_expiry() {
        assert_eq!(WriteMode::select(true, None), WriteMode::Verified);
    }

    #[test]
    fn expiry_overrides_verified() {
        let at = Utc::now();
        assert_eq!(
            WriteMode::select(true, Some(at)),
            WriteMode::Expiring { at }
        );
        assert_eq!(
            WriteMode::select(false, Some(at)),
            WriteMode::Expiring { at }
        );
    }

    #[test]
    fn deadline_adds_duration() {
        let policy = ExpiryPolicy::new(Duration::from_secs(60));
        let now = Utc::now();
        assert_eq!(policy.deadline(now), now + chrono::Duration::seconds(60));
    }
}
