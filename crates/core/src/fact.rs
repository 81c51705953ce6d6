use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fact is a typed, flat key-value record inserted into a session.
///
/// Patterns match on `fact_type` first and then on field equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    #[serde(rename = "type")]
    pub fact_type: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Fact {
    pub fn new(fact_type: impl Into<String>) -> Self {
        Self {
            fact_type: fact_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Typed field values. Untagged so YAML/JSON scalars map directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Extract as string, returning None for non-text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Float(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let fact = Fact::new("SimpleEvent")
            .with_field("source", "sensor-1")
            .with_field("reading", 42i64);
        assert_eq!(fact.fact_type, "SimpleEvent");
        assert_eq!(fact.field("source").and_then(FieldValue::as_str), Some("sensor-1"));
        assert_eq!(fact.field("reading").and_then(FieldValue::as_i64), Some(42));
        assert!(fact.field("missing").is_none());
    }

    #[test]
    fn deserializes_untagged_scalars() {
        let fact: Fact = serde_json::from_str(
            r#"{"type":"Reading","fields":{"n":3,"ratio":0.5,"ok":true,"label":"x","gone":null}}"#,
        )
        .unwrap();
        assert_eq!(fact.field("n"), Some(&FieldValue::Integer(3)));
        assert_eq!(fact.field("ratio"), Some(&FieldValue::Float(0.5)));
        assert_eq!(fact.field("ok"), Some(&FieldValue::Boolean(true)));
        assert_eq!(fact.field("label"), Some(&FieldValue::Text("x".into())));
        assert_eq!(fact.field("gone"), Some(&FieldValue::Null));
    }

    #[test]
    fn fields_default_to_empty() {
        let fact: Fact = serde_json::from_str(r#"{"type":"SimpleEvent"}"#).unwrap();
        assert!(fact.fields.is_empty());
    }
}
