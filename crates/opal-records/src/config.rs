use serde::{Deserialize, Serialize};

use opal_types::ExpiryPolicy;

use crate::keygen::DEFAULT_MAX_ATTEMPTS;

/// Configuration for a [`RecordStore`](crate::store::RecordStore).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Default expiry applied to saves when neither the record nor the
    /// request carries its own policy. `None` means values never expire
    /// unless explicitly requested.
    pub default_expiry: Option<ExpiryPolicy>,
    /// Cap on identifier-generation probe attempts.
    pub max_key_attempts: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_expiry: None,
            max_key_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_has_no_expiry() {
        let config = StoreConfig::default();
        assert!(config.default_expiry.is_none());
        assert_eq!(config.max_key_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn serde_roundtrip() {
        let config = StoreConfig {
            default_expiry: Some(ExpiryPolicy::new(Duration::from_secs(3600))),
            max_key_attempts: 8,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: StoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
