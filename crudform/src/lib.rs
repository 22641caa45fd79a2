//! # crudform
//!
//! Auto-generated CRUD forms and tables from typed data-model declarations.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on
//! `crudform` to get everything, or on individual crates for finer-grained
//! control.

/// Error types, settings, logging setup, and text helpers.
pub use crudform_core as core;

/// Schemas, field descriptors, values, and records.
pub use crudform_model as model;

/// The type-to-widget handler registry, form cards, and nested edit dialogs.
#[cfg(feature = "forms")]
pub use crudform_forms as forms;

/// CRUD tables, item dialogs, persistence hooks, and notifications.
#[cfg(feature = "admin")]
pub use crudform_admin as admin;

/// Third-party crates used in the public API.
pub use async_trait::async_trait;
pub use chrono;
pub use indexmap;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;

/// The types most applications need.
pub mod prelude {
    pub use crudform_core::{CrudConfig, CrudError, CrudResult, Settings};
    pub use crudform_model::{FieldDescriptor, InputType, ModelSchema, Record, TypeTag, Value};

    #[cfg(feature = "forms")]
    pub use crudform_forms::{
        default_registry, register_custom_handler, CardController, HandlerRegistry, InputContext,
        InputHandler, Widget, WidgetKind, WidgetValue,
    };

    #[cfg(feature = "admin")]
    pub use crudform_admin::{CrudBackend, CrudController, InMemoryBackend, NotificationLevel};
}
