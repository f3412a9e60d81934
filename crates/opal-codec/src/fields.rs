//! Insertion-ordered field maps.
//!
//! [`FieldMap`] stores field name/value pairs in the order they were first
//! inserted. Reinserting an existing name replaces the value in place, so
//! declaration order survives updates and the serialized form is stable.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ordered mapping of field names to their string representations.
///
/// All values are strings: a record field is serialized to its string
/// representation before it enters the map (`1` becomes `"1"`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    /// Create an empty field map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, converting the value to its string representation.
    ///
    /// If the name is already present the value is replaced in place and the
    /// field keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if a field with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// A copy of this map without the fields whose names `exclude` matches.
    pub fn without(&self, mut exclude: impl FnMut(&str) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| !exclude(n))
                .cloned()
                .collect(),
        }
    }
}

impl FromIterator<(String, String)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct FieldMapVisitor;

impl<'de> Visitor<'de> for FieldMapVisitor {
    type Value = FieldMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of string fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = FieldMap::new();
        while let Some((name, value)) = access.next_entry::<String, String>()? {
            map.insert(name, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_order() {
        let mut map = FieldMap::new();
        map.insert("zeta", "1");
        map.insert("alpha", "2");
        map.insert("mid", "3");
        let names: Vec<_> = map.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut map = FieldMap::new();
        map.insert("a", "1");
        map.insert("b", "2");
        map.insert("a", "updated");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some("updated"));
        let names: Vec<_> = map.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn values_are_stringified() {
        let mut map = FieldMap::new();
        map.insert("ok", 1);
        map.insert("ratio", 0.5);
        assert_eq!(map.get("ok"), Some("1"));
        assert_eq!(map.get("ratio"), Some("0.5"));
    }

    #[test]
    fn without_filters_by_name() {
        let map: FieldMap = [("keep", "1"), ("drop", "2"), ("also", "3")]
            .into_iter()
            .collect();
        let filtered = map.without(|n| n == "drop");
        assert_eq!(filtered.len(), 2);
        assert!(!filtered.contains("drop"));
        assert!(filtered.contains("keep"));
    }

    #[test]
    fn serde_preserves_member_order() {
        let map: FieldMap = [("z", "last?"), ("a", "no"), ("m", "middle")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"z":"last?","a":"no","m":"middle"}"#);
        let parsed: FieldMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn get_missing_returns_none() {
        let map = FieldMap::new();
        assert_eq!(map.get("nothing"), None);
        assert!(map.is_empty());
    }
}
