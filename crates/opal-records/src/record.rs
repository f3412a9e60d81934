use chrono::{DateTime, Utc};
use opal_codec::FieldMap;
use opal_types::{ExpiryPolicy, WriteMode};

use crate::error::RecordError;

/// A typed application record mapped onto the ledger.
///
/// Records are value objects: they own no store resources. The key is
/// assigned exactly once, before the first write, and never reused for a
/// different logical record. Mutation is modeled by re-saving under the
/// same key, which appends a new ledger entry with a new transaction id.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    key: Option<String>,
    verified: bool,
    fields: FieldMap,
    expiry: Option<ExpiryPolicy>,
}

impl Record {
    /// A new unsaved record with the given user-defined fields.
    pub fn new(fields: FieldMap) -> Self {
        Self {
            key: None,
            verified: false,
            fields,
            expiry: None,
        }
    }

    /// Require a cryptographic proof on this record's writes and reads.
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Make this record's stored values inaccessible after a duration.
    pub fn expiring(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry = Some(policy);
        self
    }

    /// The record's key, once assigned.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whether this record's operations use the verified path.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// The record's user-defined fields.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Mutable access to the fields, for re-saving with updated values.
    pub fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }

    /// The record's expiry policy, if any.
    pub fn expiry(&self) -> Option<ExpiryPolicy> {
        self.expiry
    }

    /// Assign the record's key. Fails if a key was already assigned:
    /// keys are immutable once set.
    pub fn assign_key(&mut self, key: impl Into<String>) -> Result<(), RecordError> {
        match &self.key {
            Some(existing) => Err(RecordError::KeyAlreadyAssigned(existing.clone())),
            None => {
                self.key = Some(key.into());
                Ok(())
            }
        }
    }

    /// The write mode for a save issued at `now`, given an optional
    /// store-level default expiry.
    ///
    /// Expiry takes precedence: a record that is both verified and expiring
    /// is only ever written through the expiring path. Inherited behavior,
    /// kept as-is pending product clarification.
    pub fn write_mode(&self, now: DateTime<Utc>, default_expiry: Option<ExpiryPolicy>) -> WriteMode {
        let expiry = self.expiry.or(default_expiry);
        WriteMode::select(self.verified, expiry.map(|p| p.deadline(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fields() -> FieldMap {
        [("nome", "Alice"), ("ok", "1")].into_iter().collect()
    }

    #[test]
    fn new_record_is_unsaved_and_plain() {
        let record = Record::new(fields());
        assert!(record.key().is_none());
        assert!(!record.is_verified());
        assert_eq!(
            record.write_mode(Utc::now(), None),
            WriteMode::Plain
        );
    }

    #[test]
    fn key_is_assigned_exactly_once() {
        let mut record = Record::new(fields());
        record.assign_key("k1").unwrap();
        assert_eq!(record.key(), Some("k1"));

        let err = record.assign_key("k2").unwrap_err();
        assert!(matches!(err, RecordError::KeyAlreadyAssigned(k) if k == "k1"));
        assert_eq!(record.key(), Some("k1"));
    }

    #[test]
    fn verified_record_uses_the_verified_mode() {
        let record = Record::new(fields()).verified(true);
        assert_eq!(record.write_mode(Utc::now(), None), WriteMode::Verified);
    }

    #[test]
    fn expiry_overrides_verified_mode() {
        let record = Record::new(fields())
            .verified(true)
            .expiring(ExpiryPolicy::new(Duration::from_secs(60)));
        let now = Utc::now();
        assert!(matches!(
            record.write_mode(now, None),
            WriteMode::Expiring { .. }
        ));
    }

    #[test]
    fn store_default_expiry_applies_when_record_has_none() {
        let record = Record::new(fields()).verified(true);
        let default = Some(ExpiryPolicy::new(Duration::from_secs(30)));
        assert!(matches!(
            record.write_mode(Utc::now(), default),
            WriteMode::Expiring { .. }
        ));
    }

    #[test]
    fn record_expiry_wins_over_store_default() {
        let now = Utc::now();
        let record = Record::new(fields()).expiring(ExpiryPolicy::new(Duration::from_secs(10)));
        let default = Some(ExpiryPolicy::new(Duration::from_secs(600)));
        let WriteMode::Expiring { at } = record.write_mode(now, default) else {
            panic!("expected expiring mode");
        };
        assert_eq!(at, now + chrono::Duration::seconds(10));
    }
}
