//! Named, externally observable state that consequences mutate.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Session globals keyed by name.
///
/// Values are JSON so that both programmatic consequences and declarative
/// rule actions can write to them, and callers can inspect them after a
/// fire call returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Globals {
    values: BTreeMap<String, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Append to a list global, creating it when absent.
    pub fn append(&mut self, name: &str, value: Value) -> anyhow::Result<usize> {
        let entry = self
            .values
            .entry(name.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(items) => {
                items.push(value);
                Ok(items.len())
            }
            other => anyhow::bail!("global '{}' is not a list (found {})", name, kind_of(other)),
        }
    }

    /// Add `by` to a numeric global, creating it at 0 when absent.
    pub fn increment(&mut self, name: &str, by: i64) -> anyhow::Result<i64> {
        let entry = self.values.entry(name.to_string()).or_insert(Value::from(0));
        let current = entry.as_i64().ok_or_else(|| {
            anyhow::anyhow!("global '{}' is not an integer (found {})", name, kind_of(entry))
        })?;
        let next = current
            .checked_add(by)
            .ok_or_else(|| anyhow::anyhow!("global '{}' overflowed", name))?;
        *entry = Value::from(next);
        Ok(next)
    }

    /// Length of a list global; `None` when absent or not a list.
    pub fn list_len(&self, name: &str) -> Option<usize> {
        self.values.get(name).and_then(Value::as_array).map(Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
