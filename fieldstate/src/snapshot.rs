//! Point-in-time serialization of a context: each field's definition plus its
//! current value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::normalize::{RawFieldDef, RawSchema};
use crate::patch::Patch;
use crate::store::ValueStore;
use crate::types::{FieldDef, Schema};

/// One field's definition and value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    #[serde(flatten)]
    pub field: FieldDef,
    pub value: Value,
}

/// Definitions and values of every field, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    fields: IndexMap<String, FieldSnapshot>,
}

impl Snapshot {
    pub(crate) fn capture(schema: &Schema, store: &ValueStore) -> Self {
        let fields = schema
            .iter()
            .map(|(name, def)| {
                let value = store.get(name).cloned().unwrap_or(Value::Null);
                (
                    name.to_string(),
                    FieldSnapshot {
                        field: def.clone(),
                        value,
                    },
                )
            })
            .collect();
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldSnapshot> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSnapshot)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The definitions alone, ready for normalization.
    pub fn raw_schema(&self) -> RawSchema {
        self.fields
            .iter()
            .map(|(name, snap)| (name.clone(), RawFieldDef::from(snap.field.clone())))
            .collect()
    }

    /// The values alone, as a patch.
    pub fn values(&self) -> Patch {
        self.fields
            .iter()
            .map(|(name, snap)| (name.clone(), snap.value.clone()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}
