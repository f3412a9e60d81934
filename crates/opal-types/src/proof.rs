use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::tx::TxId;

/// Cryptographic proof attached to a verified ledger entry.
///
/// A `Proof` is a domain-separated BLAKE3 hash chaining an entry onto the
/// state root that preceded it. Identical `(prev, key, value, tx)` inputs
/// always produce the same proof, so a consumer holding the previous root
/// can recompute and compare.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proof([u8; 32]);

impl Proof {
    /// Compute the proof for an entry appended after `prev`.
    ///
    /// `prev` is `None` for the first entry in a ledger. The key is
    /// length-delimited so that `(key, value)` pairs cannot collide across
    /// different split points.
    pub fn compute(prev: Option<&Proof>, key: &str, value: &[u8], tx: TxId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"opal-entry-v1:");
        if let Some(prev) = prev {
            hasher.update(&prev.0);
        }
        hasher.update(&tx.as_u64().to_le_bytes());
        hasher.update(&(key.len() as u64).to_le_bytes());
        hasher.update(key.as_bytes());
        hasher.update(value);
        Self(*hasher.finalize().as_bytes())
    }

    /// Recompute the proof from its inputs and compare against `self`.
    pub fn verify(&self, prev: Option<&Proof>, key: &str, value: &[u8], tx: TxId) -> bool {
        Self::compute(prev, key, value, tx) == *self
    }

    /// Create a proof from a pre-computed hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proof({})", self.short_hex())
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        let p1 = Proof::compute(None, "k", b"v", TxId::new(1));
        let p2 = Proof::compute(None, "k", b"v", TxId::new(1));
        assert_eq!(p1, p2);
    }

    #[test]
    fn different_inputs_produce_different_proofs() {
        let base = Proof::compute(None, "k", b"v", TxId::new(1));
        assert_ne!(base, Proof::compute(None, "k", b"w", TxId::new(1)));
        assert_ne!(base, Proof::compute(None, "j", b"v", TxId::new(1)));
        assert_ne!(base, Proof::compute(None, "k", b"v", TxId::new(2)));
        assert_ne!(base, Proof::compute(Some(&base), "k", b"v", TxId::new(1)));
    }

    #[test]
    fn key_value_split_does_not_collide() {
        // Without length delimiting, ("ab", "c") and ("a", "bc") would hash
        // the same byte stream.
        let p1 = Proof::compute(None, "ab", b"c", TxId::new(1));
        let p2 = Proof::compute(None, "a", b"bc", TxId::new(1));
        assert_ne!(p1, p2);
    }

    #[test]
    fn verify_accepts_matching_inputs() {
        let prev = Proof::compute(None, "first", b"1", TxId::new(1));
        let proof = Proof::compute(Some(&prev), "second", b"2", TxId::new(2));
        assert!(proof.verify(Some(&prev), "second", b"2", TxId::new(2)));
    }

    #[test]
    fn verify_rejects_tampered_value() {
        let proof = Proof::compute(None, "k", b"original", TxId::new(1));
        assert!(!proof.verify(None, "k", b"tampered", TxId::new(1)));
    }

    #[test]
    fn hex_roundtrip() {
        let proof = Proof::compute(None, "k", b"v", TxId::new(3));
        let parsed = Proof::from_hex(&proof.to_hex()).unwrap();
        assert_eq!(proof, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            Proof::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
        assert_eq!(
            Proof::from_hex("abcd"),
            Err(TypeError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
    }

    #[test]
    fn short_hex_is_8_chars() {
        let proof = Proof::from_hash([0xab; 32]);
        assert_eq!(proof.short_hex(), "abababab");
    }
}
