//! Order-preserving JSON value tree.
//!
//! `DocValue` mirrors `serde_json::Value` with one deliberate difference:
//! objects are stored as `Vec<(String, DocValue)>` in document order, so a
//! loaded tree round-trips key order and duplicate keys are observable
//! after parsing instead of silently last-write-wins.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// The key hoisted to the front of every object by canonical ordering.
pub const ID_KEY: &str = "id";

/// A parsed JSON value with document key order preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<DocValue>),
    Object(Vec<(String, DocValue)>),
}

impl DocValue {
    /// Lookup a top-level object entry by key (first occurrence).
    pub fn get(&self, key: &str) -> Option<&DocValue> {
        match self {
            DocValue::Object(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DocValue::Object(_))
    }

    /// All keys that occur more than once within a single object scope,
    /// anywhere in the tree. Sorted and deduplicated.
    ///
    /// A key repeated in two sibling objects is not a duplicate; only
    /// repetition inside one object scope counts.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let mut dups = BTreeSet::new();
        self.collect_duplicate_keys(&mut dups);
        dups.into_iter().collect()
    }

    fn collect_duplicate_keys(&self, dups: &mut BTreeSet<String>) {
        match self {
            DocValue::Object(entries) => {
                let mut seen = BTreeSet::new();
                for (key, value) in entries {
                    if !seen.insert(key.as_str()) {
                        dups.insert(key.clone());
                    }
                    value.collect_duplicate_keys(dups);
                }
            }
            DocValue::Array(items) => {
                for item in items {
                    item.collect_duplicate_keys(dups);
                }
            }
            _ => {}
        }
    }

    /// Canonical ordering: object keys sorted alphabetically with `id`
    /// hoisted first, applied recursively. Idempotent.
    pub fn canonicalized(&self) -> DocValue {
        match self {
            DocValue::Object(entries) => {
                let mut sorted: Vec<(String, DocValue)> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.canonicalized()))
                    .collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                if let Some(pos) = sorted.iter().position(|(k, _)| k == ID_KEY)
                    && pos > 0
                {
                    let id_entry = sorted.remove(pos);
                    sorted.insert(0, id_entry);
                }
                DocValue::Object(sorted)
            }
            DocValue::Array(items) => {
                DocValue::Array(items.iter().map(DocValue::canonicalized).collect())
            }
            other => other.clone(),
        }
    }

    /// Convert to a `serde_json::Value`.
    ///
    /// Only meaningful after strict loading: a later duplicate key would
    /// overwrite an earlier one here.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DocValue::Null => serde_json::Value::Null,
            DocValue::Bool(b) => serde_json::Value::Bool(*b),
            DocValue::Number(n) => serde_json::Value::Number(n.clone()),
            DocValue::String(s) => serde_json::Value::String(s.clone()),
            DocValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(DocValue::to_json_value).collect())
            }
            DocValue::Object(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json_value());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl Serialize for DocValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DocValue::Null => serializer.serialize_unit(),
            DocValue::Bool(b) => serializer.serialize_bool(*b),
            DocValue::Number(n) => n.serialize(serializer),
            DocValue::String(s) => serializer.serialize_str(s),
            DocValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DocValue::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct DocValueVisitor;

impl<'de> Visitor<'de> for DocValueVisitor {
    type Value = DocValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_unit<E>(self) -> Result<DocValue, E> {
        Ok(DocValue::Null)
    }

    fn visit_bool<E>(self, v: bool) -> Result<DocValue, E> {
        Ok(DocValue::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<DocValue, E> {
        Ok(DocValue::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<DocValue, E> {
        Ok(DocValue::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DocValue, E> {
        serde_json::Number::from_f64(v)
            .map(DocValue::Number)
            .ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E>(self, v: &str) -> Result<DocValue, E> {
        Ok(DocValue::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<DocValue, E> {
        Ok(DocValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<DocValue, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(DocValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<DocValue, A::Error> {
        // Duplicate keys are kept here; the loader rejects them afterwards
        // so the error can name every colliding key in the file.
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, DocValue>()? {
            entries.push((key, value));
        }
        Ok(DocValue::Object(entries))
    }
}

impl<'de> Deserialize<'de> for DocValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DocValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> DocValue {
        serde_json::from_str(text).expect("fixture must parse")
    }

    #[test]
    fn object_key_order_is_preserved() {
        let value = parse(r#"{"zulu":1,"alpha":2,"mike":3}"#);
        let rendered = serde_json::to_string(&value).expect("must serialize");
        assert_eq!(rendered, r#"{"zulu":1,"alpha":2,"mike":3}"#);
    }

    #[test]
    fn duplicate_keys_are_scoped_per_object() {
        let value = parse(r#"{"a":1,"nested":{"a":2,"a":3},"b":{"a":4}}"#);
        assert_eq!(value.duplicate_keys(), vec!["a".to_string()]);

        let clean = parse(r#"{"a":1,"nested":{"a":2},"b":{"a":4}}"#);
        assert!(clean.duplicate_keys().is_empty());
    }

    #[test]
    fn duplicate_keys_found_inside_arrays() {
        let value = parse(r#"{"items":[{"x":1},{"y":1,"y":2}]}"#);
        assert_eq!(value.duplicate_keys(), vec!["y".to_string()]);
    }

    #[test]
    fn canonicalized_sorts_keys_and_hoists_id() {
        let value = parse(r#"{"weight":3,"id":"sword_01","cost":{"gold":1,"amount":2}}"#);
        let canonical = value.canonicalized();
        let rendered = serde_json::to_string(&canonical).expect("must serialize");
        assert_eq!(
            rendered,
            r#"{"id":"sword_01","cost":{"amount":2,"gold":1},"weight":3}"#
        );
    }

    #[test]
    fn canonicalized_is_idempotent() {
        let value = parse(r#"{"b":[{"z":1,"a":2}],"id":"x","a":null}"#);
        let once = value.canonicalized();
        assert_eq!(once, once.canonicalized());
    }

    #[test]
    fn get_returns_first_occurrence() {
        let value = parse(r#"{"id":"first","id":"second"}"#);
        assert_eq!(value.get("id").and_then(DocValue::as_str), Some("first"));
    }
}
