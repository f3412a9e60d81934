//! Collision-checked record identifier generation.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;

use opal_gateway::Gateway;

use crate::error::RecordError;

/// Minimum generated key length.
pub const MIN_KEY_LEN: usize = 10;
/// Maximum generated key length.
pub const MAX_KEY_LEN: usize = 255;
/// Default cap on probe attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 32;

/// Produces globally unique record identifiers by probing the store.
///
/// Each candidate is a random alphanumeric string whose length is drawn
/// uniformly from `[MIN_KEY_LEN, MAX_KEY_LEN]`. A plain read probes the
/// candidate; a hit means the identifier is taken and a fresh candidate is
/// drawn. The loop is bounded: after `max_attempts` collisions the
/// generator fails with [`RecordError::KeySpaceExhausted`] rather than
/// retrying forever under contention.
#[derive(Clone, Debug)]
pub struct KeyGenerator {
    max_attempts: usize,
}

impl KeyGenerator {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    /// Generate an identifier that is unused at probe time.
    ///
    /// Side effect: one plain store read per attempt; no writes.
    pub fn generate(&self, gateway: &Gateway) -> Result<String, RecordError> {
        let mut rng = rand::thread_rng();
        for attempt in 1..=self.max_attempts {
            let candidate = random_key(&mut rng);
            if gateway.read(&candidate, false)?.is_none() {
                return Ok(candidate);
            }
            debug!(attempt, "generated key already taken, retrying");
        }
        Err(RecordError::KeySpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

fn random_key(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(MIN_KEY_LEN..=MAX_KEY_LEN);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
