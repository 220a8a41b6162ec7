//! Update engine.
//!
//! An update is planned in full before anything is written: every entry is
//! validated against its field definition and compared with the stored value.
//! Only a plan that validated completely is applied, so a rejected update
//! leaves the store exactly as it was.

use serde_json::Value;
use tracing::trace;

use crate::config::{ArrayChangePolicy, ContextConfig};
use crate::error::{ContextError, Result};
use crate::patch::{Delta, Patch};
use crate::store::ValueStore;
use crate::types::{FieldDef, FieldKind, Schema};
use crate::value::{is_primitive, render, type_name, values_equal};

/// Validate `patch` against `schema` and compute the fields it would change.
///
/// Undefined entries and names the store does not hold are skipped. The
/// returned delta is empty when nothing would change.
pub fn plan(
    schema: &Schema,
    store: &ValueStore,
    config: &ContextConfig,
    patch: &Patch,
) -> Result<Delta> {
    let mut delta = Delta::new();

    for (name, candidate) in patch.iter() {
        let Some(candidate) = candidate else {
            trace!(field = name, "skipping undefined entry");
            continue;
        };
        let (Some(def), Some(current)) = (schema.get(name), store.get(name)) else {
            trace!(field = name, "skipping unknown field");
            continue;
        };

        let value = validate(name, def, candidate, config)?;
        if is_change(def, current, &value, config) {
            delta.record(name, value);
        }
    }

    Ok(delta)
}

/// Write every change in `delta` to the store.
pub(crate) fn apply(store: &mut ValueStore, delta: &Delta) {
    for (name, value) in delta.iter() {
        store.replace(name, value.clone());
    }
}

/// Check one candidate value against its field definition, returning the
/// value to store.
pub fn validate(
    name: &str,
    def: &FieldDef,
    candidate: &Value,
    config: &ContextConfig,
) -> Result<Value> {
    if candidate.is_null() {
        if def.required {
            return Err(ContextError::NullOnRequired {
                field: name.to_string(),
            });
        }
        return Ok(Value::Null);
    }

    match def.kind {
        FieldKind::Array => validate_array(name, def, candidate),
        FieldKind::Enum => {
            if def.allows(candidate) {
                Ok(candidate.clone())
            } else {
                Err(ContextError::NotInEnum {
                    field: name.to_string(),
                    value: render(candidate),
                    allowed: def.allowed_values(),
                })
            }
        }
        FieldKind::String | FieldKind::Number | FieldKind::Boolean => {
            if !is_primitive(candidate) {
                return Err(ContextError::NotPrimitive {
                    field: name.to_string(),
                    actual: type_name(candidate),
                });
            }
            if config.strict_scalars && !def.kind.matches_primitive(candidate) {
                return Err(ContextError::KindMismatch {
                    field: name.to_string(),
                    expected: def.kind.as_str(),
                    actual: type_name(candidate),
                });
            }
            Ok(candidate.clone())
        }
    }
}

fn validate_array(name: &str, def: &FieldDef, candidate: &Value) -> Result<Value> {
    let Value::Array(items) = candidate else {
        return Err(ContextError::NotAnArray {
            field: name.to_string(),
            actual: type_name(candidate),
        });
    };

    for (index, item) in items.iter().enumerate() {
        if !is_primitive(item) {
            return Err(ContextError::NonPrimitiveElement {
                field: name.to_string(),
                index,
                actual: type_name(item),
            });
        }
    }

    // The default's element type wins; otherwise the first non-null element sets it.
    let declared = def
        .default
        .as_ref()
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .map(type_name);
    let expected = declared.or_else(|| items.iter().find(|v| !v.is_null()).map(type_name));

    if let Some(expected) = expected {
        for (index, item) in items.iter().enumerate() {
            if item.is_null() {
                continue;
            }
            let actual = type_name(item);
            if actual != expected {
                return Err(ContextError::ElementTypeMismatch {
                    field: name.to_string(),
                    index,
                    expected,
                    actual,
                });
            }
        }
    }

    Ok(Value::Array(items.clone()))
}

fn is_change(def: &FieldDef, current: &Value, next: &Value, config: &ContextConfig) -> bool {
    if def.kind == FieldKind::Array
        && config.array_change == ArrayChangePolicy::Always
        && next.is_array()
    {
        return true;
    }
    !values_equal(current, next)
}
