//! Documents submitted for indexing.
//!
//! A [`Document`] is an ordered mapping of field name to [`FieldValue`].
//! Nested objects are addressed by dotted path (`"nest.second"`) both when
//! inserting and when querying.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Separator between segments of a nested field path.
pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
    List(Vec<FieldValue>),
    Object(Document),
}

impl FieldValue {
    /// Converts a JSON value. Strings in RFC3339 form become dates.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        Ok(match value {
            JsonValue::Null => return Err(Error::InvalidDocument("null values cannot be indexed".into())),
            JsonValue::Bool(b) => FieldValue::Bool(b),
            JsonValue::Number(n) => FieldValue::Number(
                n.as_f64().ok_or_else(|| Error::InvalidDocument(format!("number {n} is not representable as f64")))?,
            ),
            JsonValue::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => FieldValue::Date(dt.with_timezone(&Utc)),
                Err(_) => FieldValue::Text(s),
            },
            JsonValue::Array(items) => FieldValue::List(
                items.into_iter().filter(|v| !v.is_null()).map(FieldValue::from_json).collect::<Result<_>>()?,
            ),
            JsonValue::Object(map) => FieldValue::Object(Document::from_json_map(map)?),
        })
    }

    fn collect_leaves<'a>(&'a self, path: &str, out: &mut Vec<(String, &'a FieldValue)>) {
        match self {
            FieldValue::List(items) => {
                for item in items {
                    item.collect_leaves(path, out);
                }
            }
            FieldValue::Object(doc) => doc.collect_leaves(Some(path), out),
            leaf => out.push((path.to_string(), leaf)),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::Object(doc) => doc.serialize(serializer),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<Document> for FieldValue {
    fn from(value: Document) -> Self {
        FieldValue::Object(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Document::insert`].
    pub fn with(mut self, path: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(path, value);
        self
    }

    /// Sets the value at a dotted path, creating intermediate objects.
    /// A scalar sitting where an object is needed gets replaced.
    pub fn insert(&mut self, path: &str, value: impl Into<FieldValue>) {
        match path.split_once(PATH_SEPARATOR) {
            None => {
                self.fields.insert(path.to_string(), value.into());
            }
            Some((head, rest)) => {
                let slot = self.fields.entry(head.to_string()).or_insert_with(|| FieldValue::Object(Document::new()));
                if !matches!(slot, FieldValue::Object(_)) {
                    *slot = FieldValue::Object(Document::new());
                }
                if let FieldValue::Object(child) = slot {
                    child.insert(rest, value);
                }
            }
        }
    }

    /// Looks up the value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        match path.split_once(PATH_SEPARATOR) {
            None => self.fields.get(path),
            Some((head, rest)) => match self.fields.get(head)? {
                FieldValue::Object(child) => child.get(rest),
                _ => None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Every scalar value with the dotted path it lives under. List items
    /// share the path of their list.
    pub fn leaves(&self) -> Vec<(String, &FieldValue)> {
        let mut out = Vec::new();
        self.collect_leaves(None, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: Option<&str>, out: &mut Vec<(String, &'a FieldValue)>) {
        for (key, value) in &self.fields {
            let path = match prefix {
                Some(p) => format!("{p}{PATH_SEPARATOR}{key}"),
                None => key.clone(),
            };
            value.collect_leaves(&path, out);
        }
    }

    /// Converts a JSON object. Dotted keys are expanded into nested objects
    /// and null members are skipped.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Self::from_json_map(map),
            other => Err(Error::InvalidDocument(format!("expected a JSON object, got {other}"))),
        }
    }

    fn from_json_map(map: serde_json::Map<String, JsonValue>) -> Result<Self> {
        let mut doc = Document::new();
        for (key, value) in map {
            if key.is_empty() {
                return Err(Error::InvalidDocument("field names must not be empty".into()));
            }
            if value.is_null() {
                continue;
            }
            doc.insert(&key, FieldValue::from_json(value)?);
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

impl TryFrom<JsonValue> for Document {
    type Error = Error;

    fn try_from(value: JsonValue) -> Result<Self> {
        Document::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn dotted_insert_creates_nested_objects() {
        let doc = Document::new().with("nest.second", "bit").with("nest.third", "lift it up");
        match doc.get("nest") {
            Some(FieldValue::Object(child)) => assert_eq!(child.get("second"), Some(&FieldValue::Text("bit".into()))),
            other => panic!("expected nested object, got {other:?}"),
        }
        assert_eq!(doc.get("nest.third"), Some(&FieldValue::Text("lift it up".into())));
        assert_eq!(doc.get("nest.missing"), None);
    }

    #[test]
    fn from_json_detects_dates_and_numbers() {
        let doc = Document::from_json(json!({
            "when": "2024-01-02T03:04:05Z",
            "count": 3,
            "ratio": 0.5,
            "flag": true,
            "name": "bar",
            "skip": null,
            "nest": {"first": false}
        }))
        .expect("valid document");

        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("valid date");
        assert_eq!(doc.get("when"), Some(&FieldValue::Date(when)));
        assert_eq!(doc.get("count"), Some(&FieldValue::Number(3.0)));
        assert_eq!(doc.get("ratio"), Some(&FieldValue::Number(0.5)));
        assert_eq!(doc.get("flag"), Some(&FieldValue::Bool(true)));
        assert_eq!(doc.get("name"), Some(&FieldValue::Text("bar".into())));
        assert_eq!(doc.get("skip"), None);
        assert_eq!(doc.get("nest.first"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(matches!(Document::from_json(json!("bar")), Err(Error::InvalidDocument(_))));
        assert!(matches!(Document::from_json(json!([1, 2])), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn dotted_json_keys_match_nested_objects() {
        let dotted = Document::from_json(json!({"nest.second": "bit"})).expect("valid");
        let nested = Document::from_json(json!({"nest": {"second": "bit"}})).expect("valid");
        assert_eq!(dotted, nested);
    }

    #[test]
    fn leaves_flatten_lists_and_objects() {
        let doc = Document::new().with("a", "x").with("b.c", vec![1.0, 2.0]).with("b.d", true);
        let leaves: Vec<(String, FieldValue)> = doc.leaves().into_iter().map(|(p, v)| (p, v.clone())).collect();
        assert_eq!(
            leaves,
            vec![
                ("a".to_string(), FieldValue::Text("x".into())),
                ("b.c".to_string(), FieldValue::Number(1.0)),
                ("b.c".to_string(), FieldValue::Number(2.0)),
                ("b.d".to_string(), FieldValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn serializes_dates_as_rfc3339() {
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("valid date");
        let doc = Document::new().with("when", when).with("n", 2.5);
        assert_eq!(doc.to_json(), json!({"n": 2.5, "when": "2024-01-02T03:04:05+00:00"}));
    }
}
