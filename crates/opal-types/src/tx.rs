use std::fmt;

use serde::{Deserialize, Serialize};

/// The store's global logical clock value assigned to each write.
///
/// Transaction ids are strictly increasing and globally ordered across all
/// keys. The first transaction in a ledger is `TxId(1)`; `TxId(0)` never
/// identifies a committed write.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxId(u64);

impl TxId {
    /// Wrap a raw transaction id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The next id in the global order.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// This id advanced by `step`, saturating at the numeric limit.
    pub const fn offset(self, step: u64) -> Self {
        Self(self.0.saturating_add(step))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.0)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TxId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<TxId> for u64 {
    fn from(tx: TxId) -> Self {
        tx.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_raw_value() {
        assert!(TxId::new(1) < TxId::new(2));
        assert!(TxId::new(10) > TxId::new(9));
    }

    #[test]
    fn next_increments() {
        assert_eq!(TxId::new(41).next(), TxId::new(42));
    }

    #[test]
    fn offset_saturates() {
        assert_eq!(TxId::new(u64::MAX).offset(1), TxId::new(u64::MAX));
        assert_eq!(TxId::new(5).offset(3), TxId::new(8));
        assert_eq!(TxId::new(5).offset(0), TxId::new(5));
    }

    #[test]
    fn display_is_raw_value() {
        assert_eq!(TxId::new(7).to_string(), "7");
    }

    #[test]
    fn serde_roundtrip() {
        let tx = TxId::new(99);
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, "99");
        let parsed: TxId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tx);
    }
}
