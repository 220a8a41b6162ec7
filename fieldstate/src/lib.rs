//! Typed schema-driven state container
//!
//! `fieldstate` turns a declarative field schema into an immutable value store
//! with validated partial updates and change notification.
//!
//! # Architecture
//!
//! - **Normalizer** ([`normalize()`]): raw definitions become a sealed [`Schema`];
//!   required fields must declare a default
//! - **Value store** ([`ValueStore`]): one value per field, materialized from
//!   defaults; the key set never changes
//! - **Read-only view** ([`ReadOnlyView`]): reads only, every write fails
//! - **Update engine** ([`update`]): validate everything, then apply, then
//!   notify once with the [`Delta`]
//! - **Notification hub** ([`NotificationHub`]): per-context subscribers
//!
//! Contexts are single-threaded (`!Send`); all operations complete
//! synchronously.

pub mod config;
pub mod context;
pub mod error;
pub mod normalize;
pub mod notify;
pub mod patch;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod update;
pub mod value;
pub mod view;

pub use config::{ArrayChangePolicy, ContextConfig};
pub use context::Context;
pub use error::{ContextError, ErrorCategory, MutationKind, Result};
pub use normalize::{normalize, RawFieldDef, RawSchema};
pub use notify::{NotificationHub, Subscription, SubscriptionId};
pub use patch::{Delta, Patch};
pub use snapshot::{FieldSnapshot, Snapshot};
pub use store::ValueStore;
pub use types::{EnumValue, FieldDef, FieldKind, Schema};
pub use view::{ReadOnlyView, TITLES_KEY};
