//! Schema normalization.
//!
//! Raw field definitions come from code (the `RawFieldDef` constructors) or
//! from a serialized schema. Normalization keeps only the recognized
//! attributes, enforces "required implies default", checks every default
//! against its field kind, and seals the result into a [`Schema`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{ContextError, Result};
use crate::types::{EnumValue, FieldDef, FieldKind, Schema};
use crate::value::{is_primitive, render, type_name};
use crate::view::TITLES_KEY;

/// A field definition as authored, before normalization.
///
/// Unrecognized keys (builder helpers, editor hints, anything else) are
/// captured in `extra` and discarded by [`normalize`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawFieldDef {
    #[serde(rename = "type", alias = "kind")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "enumValues", skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<EnumValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawFieldDef {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: None,
            default: None,
            title: None,
            values: Vec::new(),
            identifier: None,
            source: None,
            extra: Map::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn array() -> Self {
        Self::new(FieldKind::Array)
    }

    /// An enum field over the given literals, in declaration order.
    pub fn enumeration<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<EnumValue>,
    {
        let mut def = Self::new(FieldKind::Enum);
        def.values = values.into_iter().map(Into::into).collect();
        def
    }

    /// Mark the field required with the given default.
    pub fn required(mut self, default: impl Into<Value>) -> Self {
        self.required = Some(true);
        self.default = Some(default.into());
        self
    }

    /// Mark the field required without supplying a default.
    ///
    /// Normalization rejects this unless a default is added afterwards.
    pub fn mark_required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Flag the field as the record identifier.
    pub fn identifier(mut self) -> Self {
        self.identifier = Some(true);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach an attribute normalization will drop.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl From<FieldDef> for RawFieldDef {
    fn from(def: FieldDef) -> Self {
        Self {
            kind: def.kind,
            required: def.required.then_some(true),
            default: def.default,
            title: def.title,
            values: def.values,
            identifier: def.identifier.then_some(true),
            source: def.source,
            extra: Map::new(),
        }
    }
}

/// An ordered set of raw field definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawSchema {
    fields: IndexMap<String, RawFieldDef>,
}

impl RawSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style. A repeated name replaces the earlier
    /// definition but keeps its position.
    pub fn field(mut self, name: impl Into<String>, def: RawFieldDef) -> Self {
        self.insert(name, def);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, def: RawFieldDef) {
        self.fields.insert(name.into(), def);
    }

    pub fn get(&self, name: &str) -> Option<&RawFieldDef> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawFieldDef)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

impl From<&Schema> for RawSchema {
    fn from(schema: &Schema) -> Self {
        let fields = schema
            .iter()
            .map(|(name, def)| (name.to_string(), RawFieldDef::from(def.clone())))
            .collect();
        Self { fields }
    }
}

impl FromIterator<(String, RawFieldDef)> for RawSchema {
    fn from_iter<T: IntoIterator<Item = (String, RawFieldDef)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<RawSchema> for Schema {
    type Error = ContextError;

    fn try_from(raw: RawSchema) -> Result<Self> {
        normalize(raw)
    }
}

/// Turn raw definitions into a sealed [`Schema`].
///
/// Fails on the first field that is required without a default, uses the
/// reserved titles key as its name, or carries a default its kind rejects.
pub fn normalize(raw: RawSchema) -> Result<Schema> {
    let mut fields = IndexMap::with_capacity(raw.fields.len());

    for (name, def) in raw.fields {
        if name == TITLES_KEY {
            return Err(ContextError::ReservedFieldName { field: name });
        }
        let field = normalize_field(&name, def)?;
        fields.insert(name, field);
    }

    debug!(fields = fields.len(), "schema normalized");
    Ok(Schema::from_normalized(fields))
}

fn normalize_field(name: &str, def: RawFieldDef) -> Result<FieldDef> {
    if !def.extra.is_empty() {
        let dropped: Vec<&String> = def.extra.keys().collect();
        trace!(field = name, ?dropped, "dropping unrecognized attributes");
    }

    let required = def.required.unwrap_or(false);
    let default = def.default.filter(|v| !v.is_null());

    if required && default.is_none() {
        return Err(ContextError::RequiredWithoutDefault {
            field: name.to_string(),
        });
    }

    let values = if def.kind == FieldKind::Enum {
        dedupe(def.values)
    } else {
        if !def.values.is_empty() {
            trace!(field = name, kind = %def.kind, "ignoring enum values on non-enum field");
        }
        Vec::new()
    };

    let field = FieldDef {
        kind: def.kind,
        required,
        default,
        title: def.title,
        values,
        identifier: def.identifier.unwrap_or(false),
        source: def.source,
    };

    if let Some(default) = &field.default {
        check_default(name, &field, default)?;
    }

    Ok(field)
}

fn dedupe(values: Vec<EnumValue>) -> Vec<EnumValue> {
    let mut unique: Vec<EnumValue> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.iter().any(|u| u.matches(&value.to_value())) {
            unique.push(value);
        }
    }
    unique
}

fn check_default(name: &str, field: &FieldDef, default: &Value) -> Result<()> {
    match field.kind {
        FieldKind::String | FieldKind::Number | FieldKind::Boolean => {
            if !field.kind.matches_primitive(default) {
                return Err(ContextError::invalid_default(
                    name,
                    format!(
                        "default must be a {}, got {}",
                        field.kind,
                        type_name(default)
                    ),
                ));
            }
        }
        FieldKind::Array => check_array_default(name, default)?,
        FieldKind::Enum => {
            if !field.allows(default) {
                return Err(ContextError::invalid_default(
                    name,
                    format!(
                        "default {} is not one of [{}]",
                        render(default),
                        field.allowed_values()
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// A default array must be a flat, homogeneous sequence of non-null primitives.
pub(crate) fn check_array_default(name: &str, default: &Value) -> Result<()> {
    let Value::Array(items) = default else {
        return Err(ContextError::invalid_default(
            name,
            format!("default must be an array, got {}", type_name(default)),
        ));
    };

    let mut element_type = None;
    for (index, item) in items.iter().enumerate() {
        if item.is_null() || !is_primitive(item) {
            return Err(ContextError::invalid_default(
                name,
                format!(
                    "default element {index} is {}, expected string, number or boolean",
                    type_name(item)
                ),
            ));
        }
        let actual = type_name(item);
        match element_type {
            None => element_type = Some(actual),
            Some(expected) if expected != actual => {
                return Err(ContextError::invalid_default(
                    name,
                    format!("default element {index} is {actual}, expected {expected}"),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
