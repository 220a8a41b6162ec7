//! Core schema types for the context engine.
//!
//! A [`Schema`] is the normalized, immutable description of every field a
//! context holds. Field definitions serialize to the compact wire form
//! (`type`, `required` only when true, `default`, `title`, `values` only when
//! non-empty) via serde, so the same types back both JSON and YAML storage.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::Result;
use crate::normalize::{normalize, RawSchema};
use crate::value::values_equal;

/// The kind of a field; determines what shape the value takes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array,
    Enum,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Enum => "enum",
        }
    }

    /// Whether a non-null primitive has the runtime type of this scalar kind.
    pub fn matches_primitive(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldKind::String, Value::String(_))
                | (FieldKind::Number, Value::Number(_))
                | (FieldKind::Boolean, Value::Bool(_))
        )
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single literal an enum field may hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Number(Number),
}

impl EnumValue {
    pub fn to_value(&self) -> Value {
        match self {
            EnumValue::String(s) => Value::String(s.clone()),
            EnumValue::Number(n) => Value::Number(n.clone()),
        }
    }

    /// Numeric-aware membership test against a candidate value.
    pub fn matches(&self, value: &Value) -> bool {
        values_equal(&self.to_value(), value)
    }
}

impl std::fmt::Display for EnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumValue::String(s) => write!(f, "{s:?}"),
            EnumValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for EnumValue {
    fn from(value: &str) -> Self {
        EnumValue::String(value.to_string())
    }
}

impl From<String> for EnumValue {
    fn from(value: String) -> Self {
        EnumValue::String(value)
    }
}

impl From<i64> for EnumValue {
    fn from(value: i64) -> Self {
        EnumValue::Number(value.into())
    }
}

impl From<u64> for EnumValue {
    fn from(value: u64) -> Self {
        EnumValue::Number(value.into())
    }
}

impl From<i32> for EnumValue {
    fn from(value: i32) -> Self {
        EnumValue::Number(value.into())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A normalized field definition.
///
/// Only produced by normalization, so every `FieldDef` inside a [`Schema`]
/// already satisfies "required implies default" and has a well-shaped default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<EnumValue>,
    /// Marks the field as the record identifier.
    #[serde(default, skip_serializing_if = "is_false")]
    pub identifier: bool,
    /// Name of the data source the field is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl FieldDef {
    /// Whether `value` is one of the declared enum values.
    pub fn allows(&self, value: &Value) -> bool {
        self.values.iter().any(|v| v.matches(value))
    }

    /// Comma separated list of the declared enum values, for messages.
    pub fn allowed_values(&self) -> String {
        self.values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Display title, empty when none was declared.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// An ordered, immutable mapping from field name to [`FieldDef`].
///
/// Deserializing a `Schema` runs the normalizer, so a schema read from JSON or
/// YAML is held to the same rules as one built in code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct Schema {
    fields: IndexMap<String, FieldDef>,
}

impl Schema {
    pub(crate) fn from_normalized(fields: IndexMap<String, FieldDef>) -> Self {
        Self { fields }
    }

    /// Get a field definition by name.
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse and normalize a serialized schema.
    pub fn from_json(json: &str) -> Result<Self> {
        normalize(RawSchema::from_json(json)?)
    }

    /// Parse and normalize a YAML schema.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        normalize(RawSchema::from_yaml(yaml)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = (&'a String, &'a FieldDef);
    type IntoIter = indexmap::map::Iter<'a, String, FieldDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
