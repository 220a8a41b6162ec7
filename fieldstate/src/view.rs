//! Read-only view over the value store.
//!
//! The view shares the context's store rather than copying it, so every read
//! reflects the latest successful update. It answers reads for declared
//! fields only and refuses every write with [`ContextError::Immutable`].
//!
//! Field titles are exposed under [`TITLES_KEY`]. Schemas cannot declare a
//! field with that name; normalization rejects it.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ContextError, MutationKind, Result};
use crate::store::ValueStore;
use crate::types::Schema;

/// Reserved key under which the view exposes the field-title mapping.
pub const TITLES_KEY: &str = "$titles";

/// Write-protected projection of a context's current values.
#[derive(Debug, Clone)]
pub struct ReadOnlyView {
    store: Rc<RefCell<ValueStore>>,
    titles: Rc<IndexMap<String, String>>,
}

impl ReadOnlyView {
    pub(crate) fn new(store: Rc<RefCell<ValueStore>>, schema: &Schema) -> Self {
        let titles = schema
            .iter()
            .map(|(name, def)| (name.to_string(), def.display_title().to_string()))
            .collect();
        Self {
            store,
            titles: Rc::new(titles),
        }
    }

    /// Current value of a field, or the titles object for [`TITLES_KEY`].
    /// `None` for names the schema does not declare.
    pub fn get(&self, name: &str) -> Option<Value> {
        if name == TITLES_KEY {
            return Some(self.titles_json());
        }
        self.store.borrow().get(name).cloned()
    }

    /// Run `f` on a field's current value. The store is not borrowed while
    /// `f` runs, so `f` may update the owning context.
    pub fn with_value<R>(&self, name: &str, f: impl FnOnce(&Value) -> R) -> Option<R> {
        let value = self.store.borrow().get(name).cloned()?;
        Some(f(&value))
    }

    /// `true` for declared fields and for [`TITLES_KEY`], matching [`get`](Self::get).
    pub fn contains_key(&self, name: &str) -> bool {
        name == TITLES_KEY || self.store.borrow().contains_key(name)
    }

    /// Declared field names in schema order; [`TITLES_KEY`] is not listed.
    pub fn keys(&self) -> Vec<String> {
        self.store.borrow().keys().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }

    /// Display title of a field; empty when none was declared.
    pub fn title(&self, name: &str) -> Option<&str> {
        self.titles.get(name).map(String::as_str)
    }

    /// Field name to display title, in schema order.
    pub fn titles(&self) -> &IndexMap<String, String> {
        &self.titles
    }

    /// Copy of all current values.
    pub fn to_map(&self) -> Map<String, Value> {
        self.store.borrow().to_map()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// Always fails: values change only through `Context::update`.
    pub fn set(&self, name: &str, _value: Value) -> Result<()> {
        Err(ContextError::immutable(MutationKind::Set, name))
    }

    /// Always fails: the key set is fixed.
    pub fn delete(&self, name: &str) -> Result<()> {
        Err(ContextError::immutable(MutationKind::Delete, name))
    }

    /// Always fails: accessors cannot be added or redefined.
    pub fn define(&self, name: &str) -> Result<()> {
        Err(ContextError::immutable(MutationKind::Define, name))
    }

    fn titles_json(&self) -> Value {
        Value::Object(
            self.titles
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl Serialize for ReadOnlyView {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}
