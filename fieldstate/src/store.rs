//! Value store.
//!
//! Holds the current value of every schema field. The key set is fixed when
//! the store is initialized; afterwards values can only be replaced, and only
//! by the update engine.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::Result;
use crate::normalize::check_array_default;
use crate::types::{FieldDef, FieldKind, Schema};

/// Current field values, keyed in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueStore {
    values: IndexMap<String, Value>,
}

impl ValueStore {
    /// Materialize every field from its default or its kind's zero value.
    pub fn initialize(schema: &Schema) -> Result<Self> {
        let mut values = IndexMap::with_capacity(schema.len());
        for (name, def) in schema.iter() {
            let value = initial_value(name, def)?;
            trace!(field = name, value = %value, "initialized field");
            values.insert(name.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of the current values as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Replace the value of an existing field. Unknown names are ignored, so
    /// the key set never grows.
    pub(crate) fn replace(&mut self, name: &str, value: Value) -> Option<Value> {
        self.values
            .get_mut(name)
            .map(|slot| std::mem::replace(slot, value))
    }
}

fn initial_value(name: &str, def: &FieldDef) -> Result<Value> {
    if let Some(default) = &def.default {
        if def.kind == FieldKind::Array {
            check_array_default(name, default)?;
        }
        return Ok(default.clone());
    }
    Ok(zero_value(def))
}

/// Value a field takes when no default was declared.
pub fn zero_value(def: &FieldDef) -> Value {
    if !def.required {
        return Value::Null;
    }
    match def.kind {
        FieldKind::String => Value::String(String::new()),
        FieldKind::Number => Value::from(0),
        FieldKind::Boolean => Value::Bool(false),
        FieldKind::Array => Value::Array(Vec::new()),
        FieldKind::Enum => def
            .values
            .first()
            .map(|v| v.to_value())
            .unwrap_or(Value::Null),
    }
}
