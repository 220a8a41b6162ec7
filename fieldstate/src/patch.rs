//! Update input ([`Patch`]) and output ([`Delta`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ContextError, Result};
use crate::value::type_name;

/// A partial update: field name to candidate value.
///
/// An entry holding `None` is "undefined" and is skipped by `update`;
/// `Some(Value::Null)` asks for the field to be cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    entries: IndexMap<String, Option<Value>>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a value, builder style.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), Some(value.into()));
        self
    }

    /// Add an entry with no value. `update` ignores it.
    pub fn unset(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), None);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<Value>) {
        self.entries.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Build a patch from a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(ContextError::Json(serde::de::Error::custom(format!(
                "patch must be an object, got {}",
                type_name(&other)
            )))),
        }
    }
}

impl From<Map<String, Value>> for Patch {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            entries: map.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Patch {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v)))
                .collect(),
        }
    }
}

/// The fields one `update` call actually changed, with their new values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta {
    changes: IndexMap<String, Value>,
}

impl Delta {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, name: &str, value: Value) {
        self.changes.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.changes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.changes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.changes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.changes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_entries_have_no_value() {
        let patch = Patch::new().set("a", 1).unset("b");
        let entries: Vec<_> = patch.iter().collect();
        assert_eq!(entries, vec![("a", Some(&json!(1))), ("b", None)]);
    }

    #[test]
    fn from_json_object_keeps_order() {
        let patch = Patch::from_json(json!({"z": 1, "a": null})).unwrap();
        let names: Vec<_> = patch.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(patch.iter().nth(1).unwrap().1, Some(&Value::Null));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let err = Patch::from_json(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("patch must be an object, got array"));
    }

    #[test]
    fn delta_serializes_as_object() {
        let mut delta = Delta::new();
        delta.record("name", json!("Ann"));
        delta.record("age", json!(30));
        assert_eq!(serde_json::to_value(&delta).unwrap(), json!({"name": "Ann", "age": 30}));
        assert_eq!(delta.to_json(), json!({"name": "Ann", "age": 30}));
        assert_eq!(delta.names().collect::<Vec<_>>(), vec!["name", "age"]);
    }
}
