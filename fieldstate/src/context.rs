//! Context: main API surface of the state container.
//!
//! A [`Context`] owns a normalized schema, the value store built from its
//! defaults, a read-only view over that store, and the subscribers that hear
//! about changes. Values change only through [`Context::update`].
//!
//! Everything runs synchronously on the calling thread. A subscriber may call
//! `update` on the same context while being notified; the nested update runs
//! to completion (including its own notifications) before the outer dispatch
//! moves on to the next subscriber.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use fieldstate_common::Pretty;

use crate::config::ContextConfig;
use crate::error::Result;
use crate::normalize::{normalize, RawSchema};
use crate::notify::{NotificationHub, Subscription};
use crate::patch::{Delta, Patch};
use crate::snapshot::Snapshot;
use crate::store::ValueStore;
use crate::types::Schema;
use crate::update::{apply, plan};
use crate::view::ReadOnlyView;

/// A typed, schema-driven value container with validated partial updates.
///
/// ```rust
/// use fieldstate::{Context, Patch, RawFieldDef};
///
/// let ctx = Context::define(|schema| {
///     schema
///         .field("name", RawFieldDef::string().required("Guest"))
///         .field("age", RawFieldDef::number().optional())
/// })?;
///
/// let delta = ctx.update(Patch::new().set("name", "Ann").set("age", 30))?;
/// assert_eq!(delta.len(), 2);
/// assert_eq!(ctx.values().get("name"), Some("Ann".into()));
/// # Ok::<(), fieldstate::ContextError>(())
/// ```
pub struct Context {
    schema: Rc<Schema>,
    store: Rc<RefCell<ValueStore>>,
    view: ReadOnlyView,
    hub: NotificationHub,
    config: ContextConfig,
}

impl Context {
    /// Normalize raw definitions and build a fresh context.
    pub fn new(raw: RawSchema) -> Result<Self> {
        Self::with_config(raw, ContextConfig::default())
    }

    pub fn with_config(raw: RawSchema, config: ContextConfig) -> Result<Self> {
        Self::from_schema_with_config(normalize(raw)?, config)
    }

    /// Build a context from a definition callback.
    pub fn define<F>(f: F) -> Result<Self>
    where
        F: FnOnce(RawSchema) -> RawSchema,
    {
        Self::new(f(RawSchema::new()))
    }

    /// Build a context from an already normalized schema.
    pub fn from_schema(schema: Schema) -> Result<Self> {
        Self::from_schema_with_config(schema, ContextConfig::default())
    }

    pub fn from_schema_with_config(schema: Schema, config: ContextConfig) -> Result<Self> {
        let store = Rc::new(RefCell::new(ValueStore::initialize(&schema)?));
        let view = ReadOnlyView::new(Rc::clone(&store), &schema);
        debug!(fields = schema.len(), ?config, "context created");
        Ok(Self {
            schema: Rc::new(schema),
            store,
            view,
            hub: NotificationHub::new(),
            config,
        })
    }

    /// Restore from a serialized (JSON) schema.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_schema(Schema::from_json(json)?)
    }

    /// Restore from a YAML schema.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_schema(Schema::from_yaml(yaml)?)
    }

    /// Restore schema and values from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        Self::from_snapshot_with_config(snapshot, ContextConfig::default())
    }

    /// Restore schema and values from a snapshot. Values go through the same
    /// validation as `update`; a snapshot holding an invalid value is rejected.
    pub fn from_snapshot_with_config(snapshot: &Snapshot, config: ContextConfig) -> Result<Self> {
        let ctx = Self::from_schema_with_config(normalize(snapshot.raw_schema())?, config)?;
        ctx.update(snapshot.values())?;
        Ok(ctx)
    }

    /// Read-only view of the current values.
    pub fn values(&self) -> &ReadOnlyView {
        &self.view
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Validate and apply a partial update.
    ///
    /// Returns the fields that changed. Nothing is written unless every entry
    /// validates. Subscribers are called once, after the store is updated,
    /// and only when at least one field changed.
    pub fn update(&self, patch: impl Into<Patch>) -> Result<Delta> {
        let patch = patch.into();
        let delta = {
            let store = self.store.borrow();
            plan(&self.schema, &store, &self.config, &patch)?
        };

        if delta.is_empty() {
            debug!(entries = patch.len(), "update changed nothing");
            return Ok(delta);
        }

        apply(&mut self.store.borrow_mut(), &delta);
        debug!(changed = delta.len(), "update applied: {}", Pretty(&delta));

        self.hub.dispatch(&delta);
        Ok(delta)
    }

    /// Apply a JSON object as a partial update.
    pub fn update_json(&self, patch: Value) -> Result<Delta> {
        self.update(Patch::from_json(patch)?)
    }

    /// Register a callback for future deltas.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Delta) + 'static,
    {
        self.hub.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub.len()
    }

    /// Definitions and current values, rebuilt on every call.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.schema, &self.store.borrow())
    }

    /// Serialized schema in its wire form.
    pub fn schema_json(&self) -> Result<Value> {
        self.schema.to_json_value()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.view.to_json())
            .field("subscribers", &self.hub.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArrayChangePolicy;
    use crate::error::ContextError;
    use crate::normalize::RawFieldDef;
    use serde_json::json;
    use std::cell::Cell;

    fn profile() -> Context {
        Context::define(|schema| {
            schema
                .field("name", RawFieldDef::string().required("Guest"))
                .field("age", RawFieldDef::number().optional())
                .field("tags", RawFieldDef::array().required(json!([])))
        })
        .unwrap()
    }

    #[test_log::test]
    fn update_returns_delta_and_notifies_once() {
        let ctx = profile();
        let received = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&received);
        let _sub = ctx.subscribe(move |delta| r.borrow_mut().push(delta.to_json()));

        let delta = ctx.update(Patch::new().set("name", "Ann").set("age", 30)).unwrap();

        assert_eq!(delta.to_json(), json!({"name": "Ann", "age": 30}));
        assert_eq!(*received.borrow(), vec![json!({"name": "Ann", "age": 30})]);
        assert_eq!(ctx.values().get("name"), Some(json!("Ann")));
    }

    #[test]
    fn failed_update_is_atomic() {
        let ctx = profile();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = ctx.subscribe(move |_| c.set(c.get() + 1));

        let err = ctx
            .update(Patch::new().set("age", 5).set("name", Value::Null))
            .unwrap_err();

        assert!(matches!(err, ContextError::NullOnRequired { .. }));
        assert_eq!(ctx.values().get("age"), Some(Value::Null));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn noop_updates_do_not_notify() {
        let ctx = profile();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = ctx.subscribe(move |_| c.set(c.get() + 1));

        assert!(ctx.update(Patch::new()).unwrap().is_empty());
        assert!(ctx.update(Patch::new().unset("name")).unwrap().is_empty());
        assert!(ctx.update(Patch::new().set("name", "Guest")).unwrap().is_empty());
        assert!(ctx.update(Patch::new().set("tags", json!([]))).unwrap().is_empty());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn always_policy_reports_equal_arrays() {
        let raw = RawSchema::new().field("tags", RawFieldDef::array().required(json!([])));
        let config = ContextConfig::default().with_array_change(ArrayChangePolicy::Always);
        let ctx = Context::with_config(raw, config).unwrap();
        let delta = ctx.update(Patch::new().set("tags", json!([]))).unwrap();
        assert_eq!(delta.get("tags"), Some(&json!([])));
    }

    #[test]
    fn subscriber_sees_updated_store() {
        let ctx = Rc::new(profile());
        let seen = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&ctx);
        let s = Rc::clone(&seen);
        let _sub = ctx.subscribe(move |_| {
            if let Some(ctx) = weak.upgrade() {
                *s.borrow_mut() = ctx.values().get("name");
            }
        });
        ctx.update(Patch::new().set("name", "Ann")).unwrap();
        assert_eq!(*seen.borrow(), Some(json!("Ann")));
    }

    #[test]
    fn nested_update_from_subscriber() {
        let ctx = Rc::new(profile());
        let deltas = Rc::new(RefCell::new(Vec::new()));

        let weak = Rc::downgrade(&ctx);
        let _chain = ctx.subscribe(move |delta| {
            if delta.contains("name") {
                if let Some(ctx) = weak.upgrade() {
                    ctx.update(Patch::new().set("age", 1)).unwrap();
                }
            }
        });
        let d = Rc::clone(&deltas);
        let _log = ctx.subscribe(move |delta| d.borrow_mut().push(delta.to_json()));

        ctx.update(Patch::new().set("name", "Ann")).unwrap();

        assert_eq!(ctx.values().get("age"), Some(json!(1)));
        assert_eq!(
            *deltas.borrow(),
            vec![json!({"age": 1}), json!({"name": "Ann"})]
        );
    }

    #[test]
    fn update_from_view_read_callback() {
        let ctx = profile();
        let delta = ctx
            .values()
            .with_value("age", |_| ctx.update(Patch::new().set("age", 1)))
            .unwrap()
            .unwrap();
        assert_eq!(delta.to_json(), json!({"age": 1}));
        assert_eq!(ctx.values().get("age"), Some(json!(1)));
    }

    #[test]
    fn update_json_object() {
        let ctx = profile();
        let delta = ctx.update_json(json!({"age": 7, "unknown": true})).unwrap();
        assert_eq!(delta.to_json(), json!({"age": 7}));
    }

    #[test]
    fn snapshot_is_recomputed() {
        let ctx = profile();
        let before = ctx.snapshot();
        ctx.update(Patch::new().set("age", 3)).unwrap();
        let after = ctx.snapshot();
        assert_eq!(before.get("age").unwrap().value, Value::Null);
        assert_eq!(after.get("age").unwrap().value, json!(3));
    }

    #[test]
    fn restore_from_snapshot() {
        let ctx = profile();
        ctx.update(Patch::new().set("name", "Ann").set("tags", json!(["a"])))
            .unwrap();
        let restored = Context::from_snapshot(&ctx.snapshot()).unwrap();
        assert_eq!(restored.values().to_json(), ctx.values().to_json());
        assert_eq!(restored.schema(), ctx.schema());
    }

    #[test]
    fn restore_from_serialized_schema() {
        let ctx = profile();
        let json = ctx.schema().to_json().unwrap();
        let restored = Context::from_json(&json).unwrap();
        assert_eq!(
            restored.values().to_json(),
            json!({"name": "Guest", "age": null, "tags": []})
        );
    }

    #[test]
    fn debug_output_lists_values() {
        let ctx = profile();
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Guest"));
        assert!(debug.contains("subscribers: 0"));
    }
}
