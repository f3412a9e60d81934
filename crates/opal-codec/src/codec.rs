//! Canonical encoding of record fields.

use crate::error::CodecError;
use crate::fields::FieldMap;

/// Bookkeeping field names excluded from the payload by default.
///
/// These carry persistence machinery (codec configuration, framework ids,
/// the record key, the verified flag), not user data. The set is
/// configuration: callers with different bookkeeping conventions construct
/// the codec with their own list.
pub const DEFAULT_RESERVED: &[&str] = &["config", "id", "key", "verified"];

/// Encodes a record's declared fields into canonical bytes and back.
///
/// Encoding takes every field whose name is not reserved, in insertion
/// order, and serializes the resulting map as a JSON object. Decoding is the
/// byte-exact inverse: `decode(encode(m)) == m` for any map free of
/// reserved names.
#[derive(Clone, Debug)]
pub struct RecordCodec {
    reserved: Vec<String>,
}

impl RecordCodec {
    /// Create a codec with an explicit reserved-field set.
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
        }
    }

    /// A codec that excludes nothing.
    pub fn unfiltered() -> Self {
        Self { reserved: vec![] }
    }

    /// Returns `true` if the field name is in the reserved bookkeeping set.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|r| r == name)
    }

    /// Serialize the non-reserved fields as a canonical byte payload.
    pub fn encode(&self, fields: &FieldMap) -> Result<Vec<u8>, CodecError> {
        let payload = fields.without(|name| self.is_reserved(name));
        serde_json::to_vec(&payload).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decode a byte payload back into a field map.
    pub fn decode(&self, bytes: &[u8]) -> Result<FieldMap, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_excludes_reserved_fields() {
        let codec = RecordCodec::default();
        let fields: FieldMap = [
            ("nome", "Alice"),
            ("key", "should-not-appear"),
            ("verified", "true"),
            ("ok", "1"),
        ]
        .into_iter()
        .collect();

        let bytes = codec.encode(&fields).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get("nome"), Some("Alice"));
        assert_eq!(decoded.get("ok"), Some("1"));
        assert!(!decoded.contains("key"));
        assert!(!decoded.contains("verified"));
    }

    #[test]
    fn encode_is_deterministic() {
        let codec = RecordCodec::default();
        let fields: FieldMap = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(codec.encode(&fields).unwrap(), codec.encode(&fields).unwrap());
    }

    #[test]
    fn insertion_order_drives_the_encoding() {
        let codec = RecordCodec::unfiltered();
        let ab: FieldMap = [("a", "1"), ("b", "2")].into_iter().collect();
        let ba: FieldMap = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_ne!(codec.encode(&ab).unwrap(), codec.encode(&ba).unwrap());
    }

    #[test]
    fn stringified_numbers_survive_the_roundtrip() {
        let codec = RecordCodec::default();
        let mut fields = FieldMap::new();
        fields.insert("nome", "Alice");
        fields.insert("ok", 1);

        let decoded = codec.decode(&codec.encode(&fields).unwrap()).unwrap();
        assert_eq!(decoded.get("nome"), Some("Alice"));
        assert_eq!(decoded.get("ok"), Some("1"));
    }

    #[test]
    fn decode_rejects_non_object_payload() {
        let codec = RecordCodec::default();
        assert!(matches!(
            codec.decode(b"[1,2,3]"),
            Err(CodecError::Decode(_))
        ));
        assert!(matches!(codec.decode(b"not json"), Err(CodecError::Decode(_))));
    }

    #[test]
    fn empty_map_encodes_to_empty_object() {
        let codec = RecordCodec::default();
        let bytes = codec.encode(&FieldMap::new()).unwrap();
        assert_eq!(bytes, b"{}");
        assert!(codec.decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn custom_reserved_set_is_honored() {
        let codec = RecordCodec::new(["internal"]);
        let fields: FieldMap = [("internal", "x"), ("key", "kept")].into_iter().collect();
        let decoded = codec.decode(&codec.encode(&fields).unwrap()).unwrap();
        assert!(!decoded.contains("internal"));
        // "key" is not reserved for this codec.
        assert_eq!(decoded.get("key"), Some("kept"));
    }

    proptest! {
        #[test]
        fn roundtrip_is_exact(
            pairs in prop::collection::vec(("[a-z_][a-z0-9_]{0,12}", ".{0,40}"), 0..8)
        ) {
            let codec = RecordCodec::unfiltered();
            let map: FieldMap = pairs.into_iter().collect();
            let decoded = codec.decode(&codec.encode(&map).unwrap()).unwrap();
            prop_assert_eq!(decoded, map);
        }
    }
}
